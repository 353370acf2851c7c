//! Session storage error types.

use thiserror::Error;

/// Local storage error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StorageError {
    #[error("failed to determine data directory")]
    DataDirNotFound,

    #[error("failed to read storage file: {0}")]
    ReadFailed(String),

    #[error("failed to write storage file: {0}")]
    WriteFailed(String),

    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
}
