//! Conversion between [`Value`] graphs and plain `serde_json` documents.
//!
//! Plain JSON has no notion of instance identity. Converting into it expands
//! every shared instance in place, and converting out of it produces a tree in
//! which nothing is shared unless [`from_json_interned`] is used.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Number};

use crate::encoder::{ARRAY_KEY, ITEM_TYPE_KEY, TYPE_KEY, VALUE_KEY};
use crate::error::{CoderError, Result};
use crate::registry::TypeRegistry;
use crate::tracker::SHARING_THRESHOLD;
use crate::value::{Mapping, Native, Value};

/// Convert a JSON document into a value tree.
///
/// Numbers representable as `i64` become [`Value::Int`], all others
/// [`Value::Float`].
///
/// ```
/// use graphjson_core::{json::from_json, Value};
///
/// let value = from_json(&serde_json::json!({"n": 3, "x": 3.0})).unwrap();
/// let map = value.as_mapping().unwrap();
/// assert_eq!(map["n"], Value::Int(3));
/// assert_eq!(map["x"], Value::Float(3.0));
/// ```
pub fn from_json(json: &serde_json::Value) -> Result<Value> {
    convert(json, &mut None)
}

/// Like [`from_json`], but equal strings longer than the sharing threshold
/// become one shared instance, so the encoder writes each of them once.
pub fn from_json_interned(json: &serde_json::Value) -> Result<Value> {
    convert(json, &mut Some(HashMap::new()))
}

type Interner = Option<HashMap<String, Arc<str>>>;

fn convert(json: &serde_json::Value, interner: &mut Interner) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => convert_number(n)?,
        serde_json::Value::String(s) => Value::Text(intern(s, interner)),
        serde_json::Value::Array(items) => Value::sequence(
            items
                .iter()
                .map(|item| convert(item, interner))
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_json::Value::Object(fields) => {
            let mut map = Mapping::new();
            for (key, item) in fields {
                map.insert(key.clone(), convert(item, interner)?);
            }
            Value::from(map)
        }
    })
}

fn convert_number(n: &Number) -> Result<Value> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::Int(i));
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => Ok(Value::Float(f)),
        _ => Err(CoderError::InvalidNumber {
            position: 0,
            literal: n.to_string(),
        }),
    }
}

fn intern(text: &str, interner: &mut Interner) -> Arc<str> {
    match interner {
        Some(seen) if text.chars().count() > SHARING_THRESHOLD => seen
            .entry(text.to_string())
            .or_insert_with(|| Arc::from(text))
            .clone(),
        _ => Arc::from(text),
    }
}

/// Convert a value graph into a JSON document.
///
/// Shared instances are expanded at every occurrence. Extensions are written
/// as `{"__type": .., "value": ..}` envelopes and typed arrays as
/// `{"__itemtype": .., "array": [..]}` envelopes, so decoding the printed
/// document yields equal values.
pub fn to_json(value: &Value, registry: &TypeRegistry) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or(CoderError::NonFiniteFloat(*f))?,
        Value::Text(text) => serde_json::Value::String(text.to_string()),
        Value::Sequence(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| to_json(item, registry))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Mapping(map) => {
            let mut fields = Map::new();
            for (key, item) in map.iter() {
                fields.insert(key.clone(), to_json(item, registry)?);
            }
            serde_json::Value::Object(fields)
        }
        Value::Extension(ext) => {
            let mut fields = Map::new();
            fields.insert(TYPE_KEY.to_string(), ext.type_name().into());
            fields.insert(
                VALUE_KEY.to_string(),
                represent(ext.type_name(), ext.native(), registry)?,
            );
            serde_json::Value::Object(fields)
        }
        Value::Array(array) => {
            let canonical = registry.canonical_type(array.item_type());
            let items = array
                .items()
                .iter()
                .map(|item| array_item_json(item, canonical, registry))
                .collect::<Result<Vec<_>>>()?;
            let mut fields = Map::new();
            fields.insert(ITEM_TYPE_KEY.to_string(), array.item_type().into());
            fields.insert(ARRAY_KEY.to_string(), serde_json::Value::Array(items));
            serde_json::Value::Object(fields)
        }
    })
}

/// An item tagged with the array's canonical type is written bare unless its
/// representation is `null`; any other item keeps its own envelope.
fn array_item_json(
    item: &Value,
    canonical: Option<&str>,
    registry: &TypeRegistry,
) -> Result<serde_json::Value> {
    let Value::Extension(ext) = item else {
        return to_json(item, registry);
    };
    if canonical != Some(ext.type_name()) {
        return to_json(item, registry);
    }
    match represent(ext.type_name(), ext.native(), registry)? {
        serde_json::Value::Null => to_json(item, registry),
        bare => Ok(bare),
    }
}

/// JSON form of an extension's representation, without the type tag.
fn represent(
    type_name: &str,
    native: &dyn Native,
    registry: &TypeRegistry,
) -> Result<serde_json::Value> {
    let representation = registry
        .require(type_name)?
        .adaptor()
        .represent(type_name, native)?;
    to_json(&representation, registry)
}
