use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("token {token_id} has {actual} features, at most {max} fit a leaf")]
    TooManyFeatures {
        token_id: u16,
        actual: usize,
        max: usize,
    },

    #[error("cannot compare {expected} with {actual}")]
    Comparison {
        expected: &'static str,
        actual: &'static str,
    },
}

/// A field value that cannot be represented in its binary form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// A trait value that is not part of its type's enumeration.
    #[error("unknown feature value: type {group} has no value {value:?}")]
    UnknownValue { group: String, value: String },

    /// An image whose frame offsets do not fit the single-byte header.
    #[error("image of {width}x{height} px exceeds the 255 px frame limit")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("{0}")]
    Custom(String),
}
