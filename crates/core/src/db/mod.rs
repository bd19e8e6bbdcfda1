//! Relational persistence for clients, tickets and orders.

mod sqlite;

pub use sqlite::SqliteDeskStore;

use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Row not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique or foreign key constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Row could not be decoded.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(e.to_string())
            }
            rusqlite::Error::FromSqlConversionFailure(..) => StoreError::InvalidData(e.to_string()),
            _ => StoreError::Database(e.to_string()),
        }
    }
}
