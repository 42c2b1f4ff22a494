//! # graphjson-core
//!
//! Encoder and decoder for object graphs over JSON-compatible text.
//!
//! Plain JSON writes a value once per place it appears. This crate keeps track
//! of instance identity instead: a value reachable from several places is
//! written in full at its first occurrence, wrapped in a definition envelope,
//! and every later occurrence becomes a small reference envelope. Decoding
//! rebuilds one instance and hands it to every place that referred to it.
//! Native types outside the JSON shapes travel through registered
//! [`ConversionAdaptor`]s.
//!
//! ## Quick start
//!
//! ```rust
//! use graphjson_core::{decode, encode, Value};
//!
//! let name = Value::text("a name that is long enough to share");
//! let value = Value::mapping([
//!     ("owner", name.clone()),
//!     ("author", name),
//!     ("count", Value::Int(3)),
//! ]);
//!
//! let text = encode(&value).unwrap();
//! assert_eq!(
//!     text,
//!     r#"{"author": {"__id": 2, "value": "a name that is long enough to share"}, "count": 3, "owner": {"__ref": 2}}"#
//! );
//!
//! let back = decode(&text).unwrap();
//! assert_eq!(back, value);
//! let map = back.as_mapping().unwrap();
//! assert!(map["author"].same_instance(&map["owner"]));
//! ```
//!
//! ## Modules
//!
//! - [`value`]: the `Value` graph and extension values
//! - [`adaptor`]: conversion adaptors for custom native types
//! - [`registry`]: adaptor registry keyed by type identifier
//! - [`encoder`]: text output and the reserved envelope keys
//! - [`decoder`]: text input
//! - [`coder`]: the `Coder` facade and the default coder
//! - [`json`]: conversion to and from `serde_json` documents
//! - [`error`]: error type for encode and decode failures

pub mod adaptor;
pub mod builtin;
pub mod coder;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod json;
pub mod registry;
mod tracker;
pub mod value;

pub use adaptor::{ConversionAdaptor, DynAdaptor, FnAdaptor};
pub use coder::{decode, default_types, encode, Coder, EncodeStats};
pub use encoder::{ARRAY_KEY, ID_KEY, ITEM_TYPE_KEY, REF_KEY, TYPE_KEY, VALUE_KEY};
pub use error::{CoderError, Result};
pub use registry::{is_standard_type, standard_types, RegisteredAdaptor, TypeRegistry};
pub use tracker::SHARING_THRESHOLD;
pub use value::{Extension, Mapping, Native, TypedArray, Value, STANDARD_TYPES};
