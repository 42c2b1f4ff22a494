//! Adaptors installed in every registry built with
//! [`TypeRegistry::with_builtins`](crate::TypeRegistry::with_builtins).
//!
//! | type id     | aliases  | native                   | representation          |
//! |-------------|----------|--------------------------|-------------------------|
//! | `i8`        | `byte`   | `i8`                     | int                     |
//! | `i16`       | `short`  | `i16`                    | int                     |
//! | `i32`       | `int`    | `i32`                    | int                     |
//! | `u8`        |          | `u8`                     | int                     |
//! | `u16`       |          | `u16`                    | int                     |
//! | `u32`       |          | `u32`                    | int                     |
//! | `f32`       | `float`  | `f32`                    | float                   |
//! | `char`      |          | `char`                   | one-character text      |
//! | `timestamp` |          | `DateTime<Utc>`          | int ms since the epoch  |
//! | `vec_deque` |          | `VecDeque<Value>`        | sequence                |
//! | `hash_map`  |          | `HashMap<String, Value>` | mapping                 |

use std::collections::{HashMap, VecDeque};
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::adaptor::{ConversionAdaptor, FnAdaptor};
use crate::error::{CoderError, Result};
use crate::registry::TypeRegistry;
use crate::value::{Native, Value};

pub const TIMESTAMP_TYPE: &str = "timestamp";
pub const VEC_DEQUE_TYPE: &str = "vec_deque";
pub const HASH_MAP_TYPE: &str = "hash_map";

pub(crate) fn install(registry: &mut TypeRegistry) {
    registry.register_with_aliases("i8", &["byte"], IntegerAdaptor::<i8>::new());
    registry.register_with_aliases("i16", &["short"], IntegerAdaptor::<i16>::new());
    registry.register_with_aliases("i32", &["int"], IntegerAdaptor::<i32>::new());
    registry.register("u8", IntegerAdaptor::<u8>::new());
    registry.register("u16", IntegerAdaptor::<u16>::new());
    registry.register("u32", IntegerAdaptor::<u32>::new());

    registry.register_with_aliases(
        "f32",
        &["float"],
        FnAdaptor::new(
            |f: &f32| Value::Float(f64::from(*f)),
            |rep: &Value| match rep {
                Value::Float(f) => Ok(*f as f32),
                Value::Int(i) => Ok(*i as f32),
                other => Err(shape_error("f32", "a number", other)),
            },
        ),
    );

    registry.register(
        "char",
        FnAdaptor::new(
            |c: &char| Value::text(c.to_string()),
            |rep: &Value| {
                let text = rep
                    .as_text()
                    .ok_or_else(|| shape_error("char", "text", rep))?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(CoderError::representation(
                        "char",
                        format!("expected exactly one character, found {:?}", text),
                    )),
                }
            },
        ),
    );

    registry.register(
        TIMESTAMP_TYPE,
        FnAdaptor::new(
            |ts: &DateTime<Utc>| Value::Int(ts.timestamp_millis()),
            |rep: &Value| {
                let millis = rep
                    .as_int()
                    .ok_or_else(|| shape_error(TIMESTAMP_TYPE, "an integer", rep))?;
                DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                    CoderError::representation(
                        TIMESTAMP_TYPE,
                        format!("{millis} ms is outside the supported range"),
                    )
                })
            },
        ),
    );

    registry.register(
        VEC_DEQUE_TYPE,
        FnAdaptor::new(
            |deque: &VecDeque<Value>| Value::sequence(deque.iter().cloned()),
            |rep: &Value| {
                rep.as_sequence()
                    .map(|items| items.iter().cloned().collect::<VecDeque<Value>>())
                    .ok_or_else(|| shape_error(VEC_DEQUE_TYPE, "a sequence", rep))
            },
        ),
    );

    registry.register(
        HASH_MAP_TYPE,
        FnAdaptor::new(
            |map: &HashMap<String, Value>| {
                Value::mapping(map.iter().map(|(k, v)| (k.clone(), v.clone())))
            },
            |rep: &Value| {
                rep.as_mapping()
                    .map(|map| {
                        map.iter()
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect::<HashMap<String, Value>>()
                    })
                    .ok_or_else(|| shape_error(HASH_MAP_TYPE, "a mapping", rep))
            },
        ),
    );
}

fn shape_error(type_name: &str, expected: &str, found: &Value) -> CoderError {
    CoderError::representation(
        type_name,
        format!("expected {expected}, found {}", found.type_name()),
    )
}

/// Narrow integer carried on the wire as the wide integer shape.
struct IntegerAdaptor<T>(PhantomData<fn() -> T>);

impl<T> IntegerAdaptor<T> {
    fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> ConversionAdaptor for IntegerAdaptor<T>
where
    T: Native + Copy + Into<i64> + TryFrom<i64>,
{
    type Native = T;

    fn to_representation(&self, native: &T) -> Value {
        Value::Int((*native).into())
    }

    fn to_native(&self, representation: &Value) -> Result<T> {
        let type_name = std::any::type_name::<T>();
        let wide = representation
            .as_int()
            .ok_or_else(|| shape_error(type_name, "an integer", representation))?;
        T::try_from(wide).map_err(|_| {
            CoderError::representation(type_name, format!("{wide} is out of range"))
        })
    }
}

macro_rules! extension_from {
    ($($native:ty => $type_id:expr),* $(,)?) => {
        $(
            impl From<$native> for Value {
                fn from(native: $native) -> Self {
                    Value::extension(Arc::<str>::from($type_id), native)
                }
            }
        )*
    };
}

extension_from! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    f32 => "f32",
    char => "char",
    DateTime<Utc> => TIMESTAMP_TYPE,
    VecDeque<Value> => VEC_DEQUE_TYPE,
    HashMap<String, Value> => HASH_MAP_TYPE,
}
