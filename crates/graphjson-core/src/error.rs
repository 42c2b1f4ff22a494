//! Error types for graph encoding and decoding operations.

use thiserror::Error;

/// Errors that can occur while encoding a value graph or decoding graph text.
///
/// Every failure is local to the encode/decode call that produced it; nothing
/// is retried and no partial output is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoderError {
    /// A custom value or an extension tag has no adaptor in the registry.
    #[error("no adaptor registered for type: {type_name}")]
    UnregisteredType { type_name: String },

    /// An adaptor was handed a native value of a different Rust type.
    #[error("adaptor for '{type_name}' expects native type {expected}, found {found}")]
    AdaptorMismatch {
        type_name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An adaptor rejected the representation it was asked to convert.
    #[error("cannot convert representation to '{type_name}': {message}")]
    Representation { type_name: String, message: String },

    /// The text at `position` does not match any value shape.
    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    /// The input ended inside a string, sequence, mapping or literal.
    #[error("unexpected end of input at byte {position} while reading {context}")]
    UnexpectedEnd {
        position: usize,
        context: &'static str,
    },

    /// A numeric literal matched the number shape but could not be converted.
    #[error("invalid number literal '{literal}' at byte {position}")]
    InvalidNumber { position: usize, literal: String },

    /// A reference envelope named an id that no definition has introduced.
    #[error("reference to undefined object id {id}")]
    UndefinedReference { id: u64 },

    /// A reserved-key envelope carried a payload of the wrong kind.
    #[error("invalid envelope: {message}")]
    InvalidEnvelope { message: String },

    /// A typed array holds an item that is neither null nor of its item type.
    #[error("typed array of '{item_type}' holds an item of type '{found}'")]
    ItemTypeMismatch { item_type: String, found: String },

    /// NaN and infinities have no textual form that survives a round trip.
    #[error("cannot encode non-finite float {0}")]
    NonFiniteFloat(f64),

    /// Non-whitespace text follows the root value.
    #[error("trailing characters at byte {position}")]
    TrailingCharacters { position: usize },
}

impl CoderError {
    /// Shorthand for adaptors reporting a payload of the wrong shape.
    pub fn representation(type_name: &str, message: impl Into<String>) -> Self {
        CoderError::Representation {
            type_name: type_name.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout graphjson-core.
pub type Result<T> = std::result::Result<T, CoderError>;
