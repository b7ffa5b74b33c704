use thiserror::Error;

use crate::models::{BufferHandle, GroupHandle, NickHandle};

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A buffer handle that does not (or no longer) exist.
    #[error("Unknown buffer: {0:?}")]
    UnknownBuffer(BufferHandle),

    /// A nicklist group handle that does not (or no longer) exist.
    #[error("Unknown nicklist group: {0:?}")]
    UnknownGroup(GroupHandle),

    /// A nick handle that does not (or no longer) exist.
    #[error("Unknown nick: {0:?}")]
    UnknownNick(NickHandle),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
