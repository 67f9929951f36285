use solidify_types::FieldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid features JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token {token}: {source}")]
    Encoding {
        token: usize,
        #[source]
        source: FieldError,
    },

    #[error("feature type {group} has {count} values, codes fit at most 256")]
    TooManyValues { group: String, count: usize },

    #[error("too many tokens: {0} exceed the u16 id range")]
    TooManyTokens(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExtractResult<T> = Result<T, ExtractError>;
