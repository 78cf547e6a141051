//! Error types for orrery-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in orrery-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u16, u16),

    /// Snapshot JSON could not be deserialized
    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot could not be read
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}
