//! Encode pass 2: serialize a finished encoder tree to text.
//!
//! The serializer walks the tree built by [`tracker`](crate::tracker) top-down
//! and performs no graph analysis of its own. The only thing it consults
//! besides the node is the final `shared` flag in the identity table.
//!
//! Output is JSON-compatible text with reserved-key envelopes layered on top:
//!
//! - extension: `{"__type": "<type-id>", "value": <representation>}`
//! - definition: `{"__id": <id>, "value": <value>}`
//! - reference: `{"__ref": <id>}`
//! - typed array: `{"__itemtype": "<type-id>", "array": [...]}`
//!
//! # Example
//! ```
//! use graphjson_core::{encode, Value};
//!
//! let shared = Value::text("a string long enough to be shared");
//! let value = Value::mapping([("a", shared.clone()), ("b", shared)]);
//! assert_eq!(
//!     encode(&value).unwrap(),
//!     r#"{"a": {"__id": 2, "value": "a string long enough to be shared"}, "b": {"__ref": 2}}"#
//! );
//! ```

use crate::tracker::{IdentityTable, Node, NodeKind};

/// Key holding an extension's type identifier.
pub const TYPE_KEY: &str = "__type";
/// Key holding the payload of extension and definition envelopes.
pub const VALUE_KEY: &str = "value";
/// Key holding the object id of a definition envelope.
pub const ID_KEY: &str = "__id";
/// Key holding the object id of a reference envelope.
pub const REF_KEY: &str = "__ref";
/// Key holding the declared item type of a typed array.
pub const ITEM_TYPE_KEY: &str = "__itemtype";
/// Key holding the items of a typed array.
pub const ARRAY_KEY: &str = "array";

pub(crate) struct Serializer<'t> {
    table: &'t IdentityTable,
}

impl<'t> Serializer<'t> {
    pub(crate) fn new(table: &'t IdentityTable) -> Self {
        Self { table }
    }

    /// Write a node, framing it in a definition envelope if its instance
    /// turned out to be shared.
    pub(crate) fn write(&self, node: &Node, out: &mut String) {
        match node.entry {
            Some(index) if self.table.is_shared(index) => {
                out.push('{');
                encode_key(ID_KEY, out);
                out.push_str(&self.table.id(index).to_string());
                out.push_str(", ");
                encode_key(VALUE_KEY, out);
                self.write_content(node, out);
                out.push('}');
            }
            _ => self.write_content(node, out),
        }
    }

    fn write_content(&self, node: &Node, out: &mut String) {
        match &node.kind {
            NodeKind::Null => out.push_str("null"),
            NodeKind::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            NodeKind::Int(i) => out.push_str(&i.to_string()),
            NodeKind::Float(f) => out.push_str(&format_float(*f)),
            NodeKind::Text(text) => encode_string(text, out),
            NodeKind::Sequence(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write(item, out);
                }
                out.push(']');
            }
            NodeKind::Mapping(fields) => {
                out.push('{');
                for (i, (key, item)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    encode_key(key, out);
                    self.write(item, out);
                }
                out.push('}');
            }
            NodeKind::Extension {
                type_name,
                representation,
            } => {
                out.push('{');
                encode_key(TYPE_KEY, out);
                encode_string(type_name, out);
                out.push_str(", ");
                encode_key(VALUE_KEY, out);
                self.write(representation, out);
                out.push('}');
            }
            NodeKind::Array {
                item_type,
                canonical,
                items,
            } => {
                out.push('{');
                encode_key(ITEM_TYPE_KEY, out);
                encode_string(item_type, out);
                out.push_str(", ");
                encode_key(ARRAY_KEY, out);
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_array_item(canonical, item, out);
                }
                out.push_str("]}");
            }
            NodeKind::Reference(id) => {
                out.push('{');
                encode_key(REF_KEY, out);
                out.push_str(&id.to_string());
                out.push('}');
            }
        }
    }

    /// An unshared item tagged with the array's canonical type is written as
    /// its bare representation. The decoder restores the tag from the array.
    /// A `null` representation keeps its envelope, since a bare `null` item
    /// decodes as a null slot.
    fn write_array_item(&self, canonical: &str, item: &Node, out: &mut String) {
        let shared = item.entry.is_some_and(|index| self.table.is_shared(index));
        match &item.kind {
            NodeKind::Extension {
                type_name,
                representation,
            } if !shared
                && **type_name == *canonical
                && !matches!(representation.kind, NodeKind::Null) =>
            {
                self.write(representation, out)
            }
            _ => self.write(item, out),
        }
    }
}

/// Format a float so that it always re-parses as a float: Rust's shortest
/// round-trip representation, with `.0` appended when it has no decimal point.
/// Callers reject non-finite values before they get here.
pub(crate) fn format_float(f: f64) -> String {
    let mut s = f.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// Quote a string, escaping only backslash and double quote.
pub(crate) fn encode_string(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

fn encode_key(key: &str, out: &mut String) {
    encode_string(key, out);
    out.push_str(": ");
}
