//! Registry of conversion adaptors keyed by type identifier.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::adaptor::{ConversionAdaptor, DynAdaptor};
use crate::builtin;
use crate::error::{CoderError, Result};
use crate::value::{Value, STANDARD_TYPES};

/// An adaptor together with the canonical type identifier it was registered
/// under. Aliases resolve to the same entry.
#[derive(Clone)]
pub struct RegisteredAdaptor {
    type_id: Arc<str>,
    adaptor: Arc<dyn DynAdaptor>,
}

impl RegisteredAdaptor {
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn adaptor(&self) -> &dyn DynAdaptor {
        self.adaptor.as_ref()
    }

    /// Convert a representation into an extension value tagged with the
    /// canonical identifier.
    pub fn instantiate(&self, representation: &Value) -> Result<Value> {
        self.adaptor.instantiate(&self.type_id, representation)
    }

    /// Like [`instantiate`](Self::instantiate), but tagging the value with
    /// `tag`, which may be one of this entry's aliases.
    pub fn instantiate_as(&self, tag: &str, representation: &Value) -> Result<Value> {
        if tag == &*self.type_id {
            return self.instantiate(representation);
        }
        self.adaptor.instantiate(&Arc::from(tag), representation)
    }
}

impl fmt::Debug for RegisteredAdaptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAdaptor")
            .field("type_id", &self.type_id)
            .field("native", &self.adaptor.native_type())
            .finish()
    }
}

/// Maps type identifiers to adaptors.
///
/// Registries are plain values. A [`Coder`](crate::Coder) owns one behind an
/// `Arc` and every encode/decode call works against a snapshot of it, so
/// registering a type never affects a call that has already started.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    adaptors: HashMap<String, RegisteredAdaptor>,
}

impl TypeRegistry {
    /// An empty registry: only the standard types can be coded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in adaptors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::install(&mut registry);
        registry
    }

    /// Store the adaptor under `type_id`, replacing any previous entry.
    pub fn register<A: ConversionAdaptor>(&mut self, type_id: impl Into<String>, adaptor: A) {
        self.register_with_aliases(type_id, &[], adaptor);
    }

    /// Store the adaptor under `type_id` and each alias. A value keeps the tag
    /// it was written with, so an alias-tagged value re-encodes with its alias.
    pub fn register_with_aliases<A: ConversionAdaptor>(
        &mut self,
        type_id: impl Into<String>,
        aliases: &[&str],
        adaptor: A,
    ) {
        let type_id: String = type_id.into();
        let entry = RegisteredAdaptor {
            type_id: Arc::from(type_id.as_str()),
            adaptor: Arc::new(adaptor),
        };
        trace!(type_id = %type_id, ?aliases, "registering conversion adaptor");
        for alias in aliases {
            self.adaptors.insert((*alias).to_string(), entry.clone());
        }
        self.adaptors.insert(type_id, entry);
    }

    pub fn lookup(&self, type_id: &str) -> Option<&RegisteredAdaptor> {
        self.adaptors.get(type_id)
    }

    /// Like [`lookup`](Self::lookup) but failing with
    /// [`CoderError::UnregisteredType`].
    pub fn require(&self, type_id: &str) -> Result<&RegisteredAdaptor> {
        self.lookup(type_id)
            .ok_or_else(|| CoderError::UnregisteredType {
                type_name: type_id.to_string(),
            })
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.adaptors.contains_key(type_id)
    }

    /// Canonical identifier for a type name: standard names map to themselves,
    /// registered names (including aliases) to the identifier they were
    /// registered under.
    pub fn canonical_type<'a>(&'a self, type_id: &'a str) -> Option<&'a str> {
        if is_standard_type(type_id) {
            return Some(type_id);
        }
        self.lookup(type_id).map(RegisteredAdaptor::type_id)
    }

    /// Sorted identifiers (aliases included) of every registered adaptor.
    pub fn extended_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.adaptors.keys().cloned().collect();
        types.sort();
        types
    }

    /// Sorted union of the standard types and the extended types.
    pub fn supported_types(&self) -> Vec<String> {
        let mut types = standard_types();
        types.extend(self.extended_types());
        types.sort();
        types.dedup();
        types
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("extended_types", &self.extended_types())
            .finish()
    }
}

/// Sorted names of the types the wire format represents without an adaptor.
pub fn standard_types() -> Vec<String> {
    STANDARD_TYPES.iter().map(|t| t.to_string()).collect()
}

pub fn is_standard_type(type_id: &str) -> bool {
    STANDARD_TYPES.contains(&type_id)
}
