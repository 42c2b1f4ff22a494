//! Conversion adaptors between custom native types and representable values.
//!
//! An adaptor is a pair of pure functions: one turns a native value into a
//! [`Value`] built only from shapes the wire format understands, the other
//! turns such a value back into the native type. Round-tripping through both
//! must reproduce an equal native value.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{CoderError, Result};
use crate::value::{Extension, Native, Value};

/// Translator between a custom native type and its representation.
pub trait ConversionAdaptor: Send + Sync + 'static {
    type Native: Native;

    fn to_representation(&self, native: &Self::Native) -> Value;

    fn to_native(&self, representation: &Value) -> Result<Self::Native>;
}

/// Adaptor assembled from two closures.
///
/// ```
/// use graphjson_core::{CoderError, FnAdaptor, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(f64);
///
/// let adaptor = FnAdaptor::new(
///     |c: &Celsius| Value::Float(c.0),
///     |rep: &Value| {
///         rep.as_float()
///             .map(Celsius)
///             .ok_or_else(|| CoderError::representation("celsius", "expected a float"))
///     },
/// );
/// # let _ = adaptor;
/// ```
pub struct FnAdaptor<T, R, N> {
    to_representation: R,
    to_native: N,
    _native: PhantomData<fn() -> T>,
}

impl<T, R, N> FnAdaptor<T, R, N>
where
    T: Native,
    R: Fn(&T) -> Value + Send + Sync + 'static,
    N: Fn(&Value) -> Result<T> + Send + Sync + 'static,
{
    pub fn new(to_representation: R, to_native: N) -> Self {
        Self {
            to_representation,
            to_native,
            _native: PhantomData,
        }
    }
}

impl<T, R, N> ConversionAdaptor for FnAdaptor<T, R, N>
where
    T: Native,
    R: Fn(&T) -> Value + Send + Sync + 'static,
    N: Fn(&Value) -> Result<T> + Send + Sync + 'static,
{
    type Native = T;

    fn to_representation(&self, native: &T) -> Value {
        (self.to_representation)(native)
    }

    fn to_native(&self, representation: &Value) -> Result<T> {
        (self.to_native)(representation)
    }
}

/// Type-erased adaptor as stored in a [`TypeRegistry`](crate::TypeRegistry).
pub trait DynAdaptor: Send + Sync {
    /// Rust type name of the native side.
    fn native_type(&self) -> &'static str;

    /// Produce the representation of an extension's native value.
    fn represent(&self, type_name: &str, native: &dyn Native) -> Result<Value>;

    /// Build an extension value tagged `type_name` from a representation.
    fn instantiate(&self, type_name: &Arc<str>, representation: &Value) -> Result<Value>;
}

impl<A: ConversionAdaptor> DynAdaptor for A {
    fn native_type(&self) -> &'static str {
        std::any::type_name::<A::Native>()
    }

    fn represent(&self, type_name: &str, native: &dyn Native) -> Result<Value> {
        let native = native
            .as_any()
            .downcast_ref::<A::Native>()
            .ok_or_else(|| CoderError::AdaptorMismatch {
                type_name: type_name.to_string(),
                expected: self.native_type(),
                found: native.native_type_name(),
            })?;
        Ok(self.to_representation(native))
    }

    fn instantiate(&self, type_name: &Arc<str>, representation: &Value) -> Result<Value> {
        let native = self.to_native(representation)?;
        Ok(Value::Extension(Extension::from_parts(
            Arc::clone(type_name),
            Arc::new(native),
        )))
    }
}
