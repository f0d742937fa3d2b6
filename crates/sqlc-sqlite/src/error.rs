//! Error types for the SQLite executor.

use sqlc_core::Rejected;
use thiserror::Error;

/// Errors raised while running statements.
#[derive(Debug, Error)]
pub enum DbError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The statement could not be built or rendered.
    #[error("statement error: {0}")]
    Statement(#[from] sqlc_core::Error),
}

impl DbError {
    /// Returns `true` if a single-row fetch found no row.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::RowNotFound))
    }
}

impl<B> From<Rejected<B>> for DbError {
    fn from(rejected: Rejected<B>) -> Self {
        Self::Statement(rejected.into_error())
    }
}

/// Result type alias for executor operations.
pub type Result<T> = std::result::Result<T, DbError>;
