//! Storage error types
//!
//! The simulation itself never fails; only reading and writing settings or
//! high scores can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem read/write failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data did not parse
    #[error("malformed stored data: {0}")]
    Format(#[from] serde_json::Error),

    /// Stored data parsed but holds values the game cannot use
    #[error("invalid stored value: {0}")]
    Invalid(&'static str),

    /// No storage backend (e.g. LocalStorage disabled)
    #[error("storage unavailable: {0}")]
    Unavailable(&'static str),
}
