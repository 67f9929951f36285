use solidify_types::FieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("encoding field {index}: {source}")]
    Encoding {
        index: usize,
        #[source]
        source: FieldError,
    },

    #[error("all fields need to be of same size after encoding: got {got}, want {want}")]
    FieldSizeMismatch { got: usize, want: usize },

    #[error("bucket index overflow: offset {offset} does not fit 16 bits")]
    IndexOverflow { offset: usize },

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("compression round trip mismatch: {original} bytes in, {restored} bytes out")]
    RoundTripMismatch { original: usize, restored: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{groups} group fields do not match {stored} stored fields")]
    MappingMismatch { groups: usize, stored: usize },
}

pub type PackResult<T> = Result<T, PackError>;
