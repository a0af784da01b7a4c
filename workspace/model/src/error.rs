use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::warn;

/// Error types for the domain operations
#[derive(Error, Debug)]
pub enum ModelError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Input that is malformed or out of range (e.g. a non-positive amount)
    #[error("{0}")]
    Validation(String),

    /// Input that is well-formed but references something unusable
    #[error("{0}")]
    BadRequest(String),

    /// The addressed row does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// A unique field already holds the given value
    #[error("{0}")]
    Conflict(String),
}

impl ModelError {
    /// Maps a failed write, turning unique constraint violations into conflicts.
    pub(crate) fn on_write(err: DbErr, conflict: impl FnOnce() -> String) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                warn!("Unique constraint violation: {}", detail);
                ModelError::Conflict(conflict())
            }
            _ => ModelError::Database(err),
        }
    }
}

/// Type alias for Result with ModelError
pub type Result<T> = std::result::Result<T, ModelError>;
