//! Error types for automata-state

use thiserror::Error;

/// Errors produced by the payload codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The encoded text could not be parsed as a tagged payload.
    #[error("payload decode failed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The decoded payload was valid but not a map at the top level.
    #[error("payload is a {found}, expected a map at the top level")]
    NotAMap { found: &'static str },

    /// Floats must be finite to survive a round trip through JSON.
    #[error("non-finite float at {path}")]
    NonFiniteFloat { path: String },
}

/// Errors that can occur in the result store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Query or statement failed in the backend
    #[error("Database backend error: {0}")]
    Backend(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),

    /// A row violated the store's invariants
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Backend("disk full".to_string());
        assert!(err.to_string().contains("backend"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_codec_error_not_a_map() {
        let err = CodecError::NotAMap { found: "list" };
        assert!(err.to_string().contains("list"));
    }
}
