//! Student repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{Student, ValidatedStudent};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Insert a new student. Fails with `StudentAlreadyExists` instead of
    /// overwriting an existing id.
    async fn create(&self, student: &ValidatedStudent) -> Result<Student, DomainError>;
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Student>, DomainError>;
    async fn find_all(&self) -> Result<Vec<Student>, DomainError>;
    /// Overwrite date of birth, phone, major and `updated_at` only.
    async fn update(&self, student: &ValidatedStudent) -> Result<Student, DomainError>;
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
