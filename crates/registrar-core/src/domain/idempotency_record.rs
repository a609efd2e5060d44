// ============================================================================
// Registrar Core - Idempotency Record
// File: crates/registrar-core/src/domain/idempotency_record.rs
// Description: Stored outcome of a write command, keyed by the client key
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Idempotency record entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub id: Uuid,
    pub key: String,
    /// Serialized command (JSON)
    pub request: String,
    /// Serialized command result (JSON)
    pub response: String,
    pub status_code: u16,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    /// New record with no response yet. Stored in this state it claims the
    /// key while the command runs.
    pub fn new(key: String, request: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            request,
            response: String::new(),
            status_code: 0,
            created_at: now,
        }
    }

    pub fn set_response(&mut self, response: String, status_code: u16) {
        self.response = response;
        self.status_code = status_code;
    }

    /// False while the claiming request is still running.
    pub fn has_response(&self) -> bool {
        self.status_code != 0 && !self.response.is_empty()
    }
}
