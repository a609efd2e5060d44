// ============================================================================
// Registrar Infrastructure - In-Memory Idempotency Repository
// File: crates/registrar-infrastructure/src/database/memory/idempotency_repo_impl.rs
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use registrar_core::domain::IdempotencyRecord;
use registrar_core::error::DomainError;
use registrar_core::repositories::IdempotencyRepository;

/// Records keyed by idempotency key
#[derive(Default)]
pub struct InMemoryIdempotencyRepository {
    records: RwLock<HashMap<String, IdempotencyRecord>>,
}

impl InMemoryIdempotencyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl IdempotencyRepository for InMemoryIdempotencyRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<IdempotencyRecord>, DomainError> {
        Ok(self.records.read().get(key).cloned())
    }

    async fn create(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord, DomainError> {
        let mut records = self.records.write();

        if records.contains_key(&record.key) {
            return Err(DomainError::IdempotencyKeyExists(record.key.clone()));
        }

        records.insert(record.key.clone(), record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord, DomainError> {
        let mut records = self.records.write();

        let stored = records
            .values_mut()
            .find(|stored| stored.id == record.id)
            .ok_or_else(|| {
                DomainError::Database(format!("idempotency record {} not found", record.id))
            })?;

        stored.response = record.response.clone();
        stored.status_code = record.status_code;

        Ok(stored.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let mut records = self.records.write();

        let key = records
            .values()
            .find(|stored| stored.id == *id)
            .map(|stored| stored.key.clone())
            .ok_or_else(|| DomainError::Database(format!("idempotency record {} not found", id)))?;

        records.remove(&key);
        Ok(())
    }
}
