// ============================================================================
// Registrar Infrastructure - PostgreSQL Idempotency Repository
// File: crates/registrar-infrastructure/src/database/postgres/idempotency_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error};
use uuid::Uuid;

use registrar_core::domain::IdempotencyRecord;
use registrar_core::error::DomainError;
use registrar_core::repositories::IdempotencyRepository;

use super::is_unique_violation;

pub struct PgIdempotencyRepository {
    pool: PgPool,
}

impl PgIdempotencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct IdempotencyRecordRow {
    pub id: Uuid,
    pub key: String,
    pub request: String,
    pub response: String,
    pub status_code: i32,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<IdempotencyRecordRow> for IdempotencyRecord {
    type Error = DomainError;

    fn try_from(row: IdempotencyRecordRow) -> Result<Self, Self::Error> {
        let status_code = u16::try_from(row.status_code).map_err(|_| {
            DomainError::Database(format!(
                "idempotency record {} has invalid status code {}",
                row.id, row.status_code
            ))
        })?;

        Ok(IdempotencyRecord {
            id: row.id,
            key: row.key,
            request: row.request,
            response: row.response,
            status_code,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl IdempotencyRepository for PgIdempotencyRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<IdempotencyRecord>, DomainError> {
        let row: Option<IdempotencyRecordRow> = sqlx::query_as(
            r#"
            SELECT id, key, request, response, status_code, created_at
            FROM idempotency_records
            WHERE key = $1
            "#
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding idempotency record: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.map(IdempotencyRecord::try_from).transpose()
    }

    async fn create(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord, DomainError> {
        let row: IdempotencyRecordRow = sqlx::query_as(
            r#"
            INSERT INTO idempotency_records (id, key, request, response, status_code, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, key, request, response, status_code, created_at
            "#
        )
        .bind(record.id)
        .bind(&record.key)
        .bind(&record.request)
        .bind(&record.response)
        .bind(i32::from(record.status_code))
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            if is_unique_violation(&e) {
                debug!(idempotency_key = %record.key, "Idempotency key already stored");
                DomainError::IdempotencyKeyExists(record.key.clone())
            } else {
                error!("Database error creating idempotency record: {}", e);
                DomainError::Database(e.to_string())
            }
        })?;

        row.try_into()
    }

    async fn update(&self, record: &IdempotencyRecord) -> Result<IdempotencyRecord, DomainError> {
        let row: Option<IdempotencyRecordRow> = sqlx::query_as(
            r#"
            UPDATE idempotency_records
            SET response = $2, status_code = $3
            WHERE id = $1
            RETURNING id, key, request, response, status_code, created_at
            "#
        )
        .bind(record.id)
        .bind(&record.response)
        .bind(i32::from(record.status_code))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating idempotency record: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.ok_or_else(|| {
            DomainError::Database(format!("idempotency record {} not found", record.id))
        })?
        .try_into()
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM idempotency_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error deleting idempotency record: {}", e);
                DomainError::Database(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Database(format!(
                "idempotency record {} not found",
                id
            )));
        }

        Ok(())
    }
}
