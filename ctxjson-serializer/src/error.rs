use serde_json::Value as JsonValue;
use thiserror::Error;

/// Error types for context-aware marshaling
#[derive(Error, Debug)]
pub enum MarshalError {
    #[error(
        "invalid handler signature for `{owner}::{method}` (field `{field}`): must be fn(&self, context: &str) -> value OR fn(&self, context: &str) -> (value, key)"
    )]
    InvalidHandlerSignature {
        owner: &'static str,
        field: &'static str,
        method: String,
    },

    #[error("invalid key returned by handler `{owner}::{method}` (field `{field}`): {found}")]
    InvalidKeyOverride {
        owner: &'static str,
        field: &'static str,
        method: String,
        found: JsonValue,
    },

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("maximum traversal depth of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },

    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for marshaling operations
pub type Result<T> = std::result::Result<T, MarshalError>;
