//! Domain errors for the issue tracker.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while handling issues.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Issue not found: {0}")]
    IssueNotFound(Uuid),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}
