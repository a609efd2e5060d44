//! Domain errors

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),

    #[error("Student already exists: {0}")]
    StudentAlreadyExists(Uuid),

    #[error("Idempotency key already exists: {0}")]
    IdempotencyKeyExists(String),

    #[error("Request with idempotency key {0} is still in progress")]
    IdempotencyKeyInFlight(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::StudentNotFound(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
