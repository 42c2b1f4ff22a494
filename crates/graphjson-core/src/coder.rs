//! The public facade: a [`Coder`] pairs a type registry with the encode and
//! decode passes.
//!
//! The default coder is built once, on first use, from
//! [`TypeRegistry::with_builtins`] and is never mutated afterwards. Callers that
//! need custom types take a private copy with [`Coder::new_instance`] and
//! register on that.

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::debug;

use crate::adaptor::ConversionAdaptor;
use crate::decoder;
use crate::encoder::Serializer;
use crate::error::Result;
use crate::registry::TypeRegistry;
use crate::tracker;
use crate::value::Value;

static DEFAULT_CODER: OnceLock<Coder> = OnceLock::new();

/// Counts gathered while encoding one value graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeStats {
    /// Instances that took part in identity tracking.
    pub tracked: usize,
    /// Definition envelopes written (one per shared instance).
    pub definitions: usize,
    /// Reference envelopes written.
    pub references: usize,
    /// Length of the encoded text in bytes.
    pub bytes: usize,
}

/// Encoder/decoder bound to a registry snapshot.
///
/// Cloning a coder is cheap and the clone starts out with the same registry.
/// Registering a type on one coder copies the registry first if anything else
/// still holds it, so other coders and calls already in flight are unaffected.
#[derive(Clone, Debug)]
pub struct Coder {
    registry: Arc<TypeRegistry>,
}

impl Default for Coder {
    fn default() -> Self {
        Self::with_registry(TypeRegistry::with_builtins())
    }
}

impl Coder {
    /// The process-wide coder with the built-in adaptors.
    pub fn default_coder() -> &'static Coder {
        DEFAULT_CODER.get_or_init(Coder::default)
    }

    /// A private coder whose registry starts as a copy of the default one.
    pub fn new_instance() -> Coder {
        Self::default_coder().clone()
    }

    pub fn with_registry(registry: TypeRegistry) -> Coder {
        Coder {
            registry: Arc::new(registry),
        }
    }

    /// Register `adaptor` under `type_id`, replacing any previous entry.
    pub fn register_type<A: ConversionAdaptor>(&mut self, type_id: impl Into<String>, adaptor: A) {
        Arc::make_mut(&mut self.registry).register(type_id, adaptor);
    }

    pub fn register_type_with_aliases<A: ConversionAdaptor>(
        &mut self,
        type_id: impl Into<String>,
        aliases: &[&str],
        adaptor: A,
    ) {
        Arc::make_mut(&mut self.registry).register_with_aliases(type_id, aliases, adaptor);
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Sorted standard and extended type identifiers.
    pub fn supported_types(&self) -> Vec<String> {
        self.registry.supported_types()
    }

    /// Sorted identifiers with a registered adaptor, aliases included.
    pub fn extended_types(&self) -> Vec<String> {
        self.registry.extended_types()
    }

    /// Encode a value graph to text. Instances reachable more than once are
    /// written in full at their first occurrence and referenced afterwards.
    pub fn encode(&self, value: &Value) -> Result<String> {
        self.encode_with_stats(value).map(|(text, _)| text)
    }

    /// Like [`encode`](Self::encode), also returning sharing counts.
    pub fn encode_with_stats(&self, value: &Value) -> Result<(String, EncodeStats)> {
        let registry = Arc::clone(&self.registry);
        let tree = tracker::build(&registry, value)?;

        let mut out = String::new();
        Serializer::new(&tree.table).write(&tree.root, &mut out);

        let stats = EncodeStats {
            tracked: tree.table.tracked(),
            definitions: tree.table.shared(),
            references: tree.references,
            bytes: out.len(),
        };
        debug!(
            tracked = stats.tracked,
            definitions = stats.definitions,
            references = stats.references,
            bytes = stats.bytes,
            "encoded value graph"
        );
        Ok((out, stats))
    }

    /// Decode text produced by [`encode`](Self::encode), rebuilding shared
    /// instances from definition and reference envelopes.
    pub fn decode(&self, text: &str) -> Result<Value> {
        let registry = Arc::clone(&self.registry);
        let (value, references) = decoder::decode_with(text, &registry)?;
        debug!(
            bytes = text.len(),
            definitions = references.len(),
            "decoded value graph"
        );
        Ok(value)
    }
}

/// Encode with the default coder.
pub fn encode(value: &Value) -> Result<String> {
    Coder::default_coder().encode(value)
}

/// Decode with the default coder.
pub fn decode(text: &str) -> Result<Value> {
    Coder::default_coder().decode(text)
}

/// Supported types of the default coder.
pub fn default_types() -> Vec<String> {
    Coder::default_coder().supported_types()
}
