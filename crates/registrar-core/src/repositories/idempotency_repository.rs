//! Idempotency repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::IdempotencyRecord;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdempotencyRepository: Send + Sync {
    /// Exact, case-sensitive key lookup.
    async fn find_by_key(&self, key: &str) -> Result<Option<IdempotencyRecord>, DomainError>;
    /// Fails with `IdempotencyKeyExists` when the key is taken.
    async fn create(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord, DomainError>;
    /// Rewrite the stored response of an existing record, matched by id.
    async fn update(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord, DomainError>;
    /// Release a claim, matched by record id.
    async fn delete(&self, id: &Uuid) -> Result<(), DomainError>;
}
