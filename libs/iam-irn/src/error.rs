//! Error types for IRN construction, parsing and decoding.

use thiserror::Error;

/// Errors produced while building, parsing or decoding an [`Irn`](crate::Irn).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrnError {
    /// A required field was empty.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    /// A field contained a reserved delimiter.
    #[error("{field} must not contain '{delimiter}': {value:?}")]
    ReservedCharacter {
        field: &'static str,
        delimiter: char,
        value: String,
    },

    /// A path segment was empty or contained the path separator.
    #[error("invalid path segment {segment:?}")]
    InvalidPathSegment { segment: String },

    /// The canonical string did not have the expected shape.
    #[error("malformed IRN {input:?}: {reason}")]
    Malformed { input: String, reason: &'static str },

    /// The compact form was not valid URL-safe base64 or not UTF-8.
    #[error("invalid IRN encoding: {0}")]
    Encoding(String),
}
