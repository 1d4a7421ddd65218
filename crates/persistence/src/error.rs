//! Storage error type.

use thiserror::Error;

/// Error type for snapshot storage and collection commits.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed for record {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown record: {0}")]
    UnknownRecord(String),

    #[error("Invalid seed fixture: {0}")]
    Seed(String),
}

impl StoreError {
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            key: key.into(),
            source,
        }
    }

    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        StoreError::Serialization {
            key: key.into(),
            source,
        }
    }
}

/// A write would give two users the same email.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Email already registered")]
pub struct EmailTaken;
