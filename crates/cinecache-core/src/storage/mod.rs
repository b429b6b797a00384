//! Durable key-value storage for user state.
//!
//! This module provides the `KeyValueStore` trait the user state writes
//! through to, plus two implementations:
//!
//! - `FileStore`: one file per record under a data directory
//! - `MemoryStore`: process-local store, shared between clones
//!
//! Reads and writes are synchronous.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read record {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write record {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record {key}: {reason}")]
    Malformed { key: String, reason: String },

    #[error("Failed to encode record {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A blob store of named string records.
pub trait KeyValueStore: Send {
    /// `Ok(None)` when the record does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent record is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}
