//! Decoder: recursive-descent parser from text back into a value graph.
//!
//! The parser keeps a byte cursor into the original buffer and never slices out
//! intermediate substrings. Dispatch is on the first non-whitespace character:
//!
//! - `+ - . 0-9` → number (`Float` if the literal contains a `.`, else `Int`)
//! - `t` / `f` → bool, `n` → null
//! - `"` → text, `[` → sequence, `{` → mapping
//!
//! After a mapping's pairs are read its keys are inspected for reserved-key
//! envelopes (see [`encoder`](crate::encoder)). A definition stores its value in
//! the per-call [`ReferenceTable`] and a reference hands back a clone of the
//! stored value, which is the same instance. This is how sharing is rebuilt.
//!
//! # Key design decisions
//!
//! - **Lexical number typing**: `3` is `Int`, `3.0` is `Float`. A literal with an
//!   exponent but no point (`1e5`) is classified integral and then fails to
//!   parse, which is reported as [`CoderError::InvalidNumber`].
//! - **Escapes**: a backslash makes the following character literal. There are
//!   no multi-character escape sequences, so `\n` decodes to `n`.
//! - **Trailing commas** before `]` or `}` are accepted.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::encoder::{ARRAY_KEY, ID_KEY, ITEM_TYPE_KEY, REF_KEY, TYPE_KEY, VALUE_KEY};
use crate::error::{CoderError, Result};
use crate::registry::{is_standard_type, TypeRegistry};
use crate::value::{Mapping, TypedArray, Value};

/// Values introduced by definition envelopes, keyed by object id. Lives for a
/// single decode call.
#[derive(Debug, Default)]
pub(crate) struct ReferenceTable {
    values: HashMap<u64, Value>,
}

impl ReferenceTable {
    fn define(&mut self, id: u64, value: Value) {
        trace!(id, "defined shared object");
        self.values.insert(id, value);
    }

    fn resolve(&self, id: u64) -> Result<Value> {
        trace!(id, "resolving reference");
        self.values
            .get(&id)
            .cloned()
            .ok_or(CoderError::UndefinedReference { id })
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

/// Decode `text` against `registry`. Surrounding whitespace is ignored; any
/// other text after the root value is an error.
pub(crate) fn decode_with(text: &str, registry: &TypeRegistry) -> Result<(Value, ReferenceTable)> {
    let mut parser = Parser::new(text.trim(), registry);
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(CoderError::TrailingCharacters {
            position: parser.pos,
        });
    }
    Ok((value, parser.references))
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    registry: &'a TypeRegistry,
    references: ReferenceTable,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, registry: &'a TypeRegistry) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            registry,
            references: ReferenceTable::default(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Parse the next value, dispatching on its first significant character.
    fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(CoderError::UnexpectedEnd {
                position: self.pos,
                context: "value",
            }),
            Some(b'+' | b'-' | b'.' | b'0'..=b'9') => self.parse_number(),
            Some(b't') => self.parse_literal("true", Value::Bool(true)),
            Some(b'f') => self.parse_literal("false", Value::Bool(false)),
            Some(b'n') => self.parse_literal("null", Value::Null),
            Some(b'"') => self.parse_text().map(Value::Text),
            Some(b'[') => self.parse_sequence(),
            Some(b'{') => self.parse_mapping(),
            Some(_) => Err(self.unexpected("a value")),
        }
    }

    /// Scan `[+-]?((\d+\.?\d*)|(\.?\d+))([eE][+-]?\d+)?` from the cursor.
    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let int_digits = self.skip_digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
        }
        let frac_digits = self.skip_digits();
        if int_digits == 0 && frac_digits == 0 {
            return Err(CoderError::InvalidNumber {
                position: start,
                literal: self.src[start..self.pos].to_string(),
            });
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                // Not an exponent after all; leave it for the caller.
                self.pos = mark;
            }
        }

        let literal = &self.src[start..self.pos];
        let invalid = || CoderError::InvalidNumber {
            position: start,
            literal: literal.to_string(),
        };
        if literal.contains('.') {
            literal.parse::<f64>().map(Value::Float).map_err(|_| invalid())
        } else {
            literal.parse::<i64>().map(Value::Int).map_err(|_| invalid())
        }
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn parse_literal(&mut self, word: &'static str, value: Value) -> Result<Value> {
        let rest = &self.src[self.pos..];
        if rest.starts_with(word) {
            self.pos += word.len();
            return Ok(value);
        }
        if word.starts_with(rest) {
            return Err(CoderError::UnexpectedEnd {
                position: self.bytes.len(),
                context: word,
            });
        }
        Err(CoderError::Syntax {
            position: self.pos,
            message: format!("expected '{word}'"),
        })
    }

    /// Parse a quoted string. The cursor must be on the opening quote.
    fn parse_text(&mut self) -> Result<Arc<str>> {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(CoderError::UnexpectedEnd {
                        position: start,
                        context: "string",
                    })
                }
                Some(b'"') => {
                    text.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(Arc::from(text));
                }
                Some(b'\\') => {
                    text.push_str(&self.src[run_start..self.pos]);
                    let escaped = self.src[self.pos + 1..].chars().next().ok_or(
                        CoderError::UnexpectedEnd {
                            position: start,
                            context: "string",
                        },
                    )?;
                    text.push(escaped);
                    self.pos += 1 + escaped.len_utf8();
                    run_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_sequence(&mut self) -> Result<Value> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(b']') {
                self.pos += 1;
                break;
            }
            items.push(self.parse_value()?);
            if self.expect_separator(b']', start, "sequence")? {
                break;
            }
        }
        Ok(Value::Sequence(Arc::new(items)))
    }

    fn parse_mapping(&mut self) -> Result<Value> {
        let start = self.pos;
        self.pos += 1;
        let mut fields = Mapping::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                Some(b'"') => {}
                Some(_) => return Err(self.unexpected("a string key or '}'")),
                None => {
                    return Err(CoderError::UnexpectedEnd {
                        position: start,
                        context: "mapping",
                    })
                }
            }
            let key = self.parse_text()?;
            self.skip_whitespace();
            match self.peek() {
                Some(b':') => self.pos += 1,
                Some(_) => return Err(self.unexpected("':'")),
                None => {
                    return Err(CoderError::UnexpectedEnd {
                        position: start,
                        context: "mapping",
                    })
                }
            }
            let value = self.parse_value()?;
            fields.insert(key.to_string(), value);
            if self.expect_separator(b'}', start, "mapping")? {
                break;
            }
        }
        self.resolve_envelope(fields)
    }

    /// Consume `,` (returns false) or the closing byte (returns true).
    fn expect_separator(&mut self, close: u8, start: usize, context: &'static str) -> Result<bool> {
        self.skip_whitespace();
        match self.peek() {
            Some(b',') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b) if b == close => {
                self.pos += 1;
                Ok(true)
            }
            Some(_) => Err(self.unexpected(if close == b']' {
                "',' or ']'"
            } else {
                "',' or '}'"
            })),
            None => Err(CoderError::UnexpectedEnd {
                position: start,
                context,
            }),
        }
    }

    fn unexpected(&self, expected: &str) -> CoderError {
        let found = self.src[self.pos..].chars().next().unwrap_or(' ');
        CoderError::Syntax {
            position: self.pos,
            message: format!("expected {expected}, found '{found}'"),
        }
    }

    /// Turn a parsed mapping into the value it stands for: an extension, a
    /// typed array, a definition, a reference, or just a mapping.
    fn resolve_envelope(&mut self, mut fields: Mapping) -> Result<Value> {
        if fields.contains_key(TYPE_KEY) && fields.contains_key(VALUE_KEY) {
            let type_name = envelope_text(&fields, TYPE_KEY)?;
            let entry = self.registry.require(&type_name)?;
            let representation = fields.remove(VALUE_KEY).unwrap_or(Value::Null);
            return entry.instantiate_as(&type_name, &representation);
        }
        if fields.contains_key(ITEM_TYPE_KEY) && fields.contains_key(ARRAY_KEY) {
            let item_type = envelope_text(&fields, ITEM_TYPE_KEY)?;
            let items = fields.remove(ARRAY_KEY).unwrap_or(Value::Null);
            return self.resolve_typed_array(&item_type, &items);
        }
        if fields.contains_key(ID_KEY) && fields.contains_key(VALUE_KEY) {
            let id = envelope_id(&fields, ID_KEY)?;
            let value = fields.remove(VALUE_KEY).unwrap_or(Value::Null);
            self.references.define(id, value.clone());
            return Ok(value);
        }
        if fields.contains_key(REF_KEY) {
            let id = envelope_id(&fields, REF_KEY)?;
            return self.references.resolve(id);
        }
        Ok(Value::Mapping(Arc::new(fields)))
    }

    fn resolve_typed_array(&self, item_type: &str, items: &Value) -> Result<Value> {
        let items = items.as_sequence().ok_or_else(|| CoderError::InvalidEnvelope {
            message: format!("'{ARRAY_KEY}' must hold a sequence, found {}", items.type_name()),
        })?;

        if is_standard_type(item_type) {
            let items = items
                .iter()
                .map(|item| coerce_standard_item(item_type, item))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::typed_array(item_type, items));
        }

        let entry = self.registry.require(item_type)?;
        let items = items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(Value::Null),
                Value::Extension(ext)
                    if self.registry.canonical_type(ext.type_name()) == Some(entry.type_id()) =>
                {
                    Ok(item.clone())
                }
                // Bare items carry no tag of their own.
                other => entry.instantiate(other),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(Arc::new(TypedArray::new(item_type, items))))
    }
}

/// Items of a standard-typed array must already have that shape. Integral
/// literals are accepted where floats are declared.
fn coerce_standard_item(item_type: &str, item: &Value) -> Result<Value> {
    match item {
        Value::Null => Ok(Value::Null),
        Value::Int(i) if item_type == "f64" => Ok(Value::Float(*i as f64)),
        other if other.type_name() == item_type => Ok(other.clone()),
        other => Err(CoderError::ItemTypeMismatch {
            item_type: item_type.to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

fn envelope_text(fields: &Mapping, key: &str) -> Result<String> {
    fields
        .get(key)
        .and_then(Value::as_text)
        .map(str::to_string)
        .ok_or_else(|| CoderError::InvalidEnvelope {
            message: format!("'{key}' must hold a string"),
        })
}

fn envelope_id(fields: &Mapping, key: &str) -> Result<u64> {
    fields
        .get(key)
        .and_then(Value::as_int)
        .and_then(|id| u64::try_from(id).ok())
        .ok_or_else(|| CoderError::InvalidEnvelope {
            message: format!("'{key}' must hold a non-negative integer id"),
        })
}
