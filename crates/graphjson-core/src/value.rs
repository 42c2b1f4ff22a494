//! The in-memory value graph that the coder encodes and decodes.
//!
//! Scalars are stored inline. Text, sequences, mappings, extensions and typed
//! arrays live behind an `Arc`, and the `Arc` allocation *is* the instance
//! identity the encoder tracks: cloning a [`Value`] hands out another handle to
//! the same instance, which is how a graph expresses sharing. Because values are
//! immutable once built, a graph can share subtrees but can never contain a
//! cycle.
//!
//! `PartialEq` is structural. Use [`Value::same_instance`] to ask whether two
//! handles point at one instance.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// String-keyed mapping. Key order carries no meaning; the encoder writes keys
/// in sorted order so that output is deterministic.
pub type Mapping = BTreeMap<String, Value>;

/// Type names of the shapes the wire format represents without an adaptor.
pub const STANDARD_TYPES: [&str; 6] = ["bool", "f64", "i64", "mapping", "sequence", "text"];

/// A native Rust value that can travel inside [`Value::Extension`].
///
/// Implemented automatically for every `'static` type that is `Debug`,
/// `PartialEq`, `Send` and `Sync`.
pub trait Native: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Structural equality against another native of unknown type.
    fn native_eq(&self, other: &dyn Native) -> bool;

    /// The Rust type name, used in adaptor mismatch errors.
    fn native_type_name(&self) -> &'static str;
}

impl<T> Native for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn native_eq(&self, other: &dyn Native) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn native_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A custom native value tagged with the type identifier of its adaptor.
#[derive(Clone)]
pub struct Extension {
    type_name: Arc<str>,
    native: Arc<dyn Native>,
}

impl Extension {
    pub fn new<T: Native>(type_name: impl Into<Arc<str>>, native: T) -> Self {
        Self {
            type_name: type_name.into(),
            native: Arc::new(native),
        }
    }

    pub(crate) fn from_parts(type_name: Arc<str>, native: Arc<dyn Native>) -> Self {
        Self { type_name, native }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn native(&self) -> &dyn Native {
        self.native.as_ref()
    }

    pub fn downcast_ref<T: Native>(&self) -> Option<&T> {
        self.native.as_ref().as_any().downcast_ref::<T>()
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.native) as *const () as usize
    }
}

impl PartialEq for Extension {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.native.as_ref().native_eq(other.native.as_ref())
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("type_name", &self.type_name)
            .field("native", &self.native)
            .finish()
    }
}

/// A sequence declared to hold items of a single type.
///
/// Items must be `Null` or values of `item_type`; the encoder rejects anything
/// else. When `item_type` names an extension, unshared items are written as
/// bare representations and the tag is implied by the array.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    item_type: String,
    items: Vec<Value>,
}

impl TypedArray {
    pub fn new(item_type: impl Into<String>, items: Vec<Value>) -> Self {
        Self {
            item_type: item_type.into(),
            items,
        }
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// A value in the object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(Arc<str>),
    Sequence(Arc<Vec<Value>>),
    Mapping(Arc<Mapping>),
    Extension(Extension),
    Array(Arc<TypedArray>),
}

impl Value {
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Value::Text(text.into())
    }

    pub fn sequence(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Sequence(Arc::new(items.into_iter().collect()))
    }

    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Mapping(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn extension<T: Native>(type_name: impl Into<Arc<str>>, native: T) -> Self {
        Value::Extension(Extension::new(type_name, native))
    }

    pub fn typed_array(item_type: impl Into<String>, items: Vec<Value>) -> Self {
        Value::Array(Arc::new(TypedArray::new(item_type, items)))
    }

    /// Name of this value's type: a standard type name, the extension's type
    /// identifier, `"array"` for typed arrays or `"null"`.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "i64",
            Value::Float(_) => "f64",
            Value::Text(_) => "text",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Extension(ext) => ext.type_name(),
            Value::Array(_) => "array",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_extension(&self) -> Option<&Extension> {
        match self {
            Value::Extension(ext) => Some(ext),
            _ => None,
        }
    }

    pub fn as_typed_array(&self) -> Option<&TypedArray> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Downcast an extension value to its native type.
    pub fn downcast_ref<T: Native>(&self) -> Option<&T> {
        self.as_extension().and_then(|ext| ext.downcast_ref::<T>())
    }

    /// True when both handles refer to the same heap instance. Scalars have no
    /// identity and always answer false.
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self.address(), other.address()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Address of the shared allocation behind heap variants.
    pub(crate) fn address(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(Arc::as_ptr(s) as *const u8 as usize),
            Value::Sequence(items) => Some(Arc::as_ptr(items) as usize),
            Value::Mapping(map) => Some(Arc::as_ptr(map) as usize),
            Value::Extension(ext) => Some(ext.address()),
            Value::Array(array) => Some(Arc::as_ptr(array) as usize),
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(Arc::new(items))
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(Arc::new(map))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
