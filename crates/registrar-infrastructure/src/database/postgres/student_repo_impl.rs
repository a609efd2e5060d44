// ============================================================================
// Registrar Infrastructure - PostgreSQL Student Repository
// File: crates/registrar-infrastructure/src/database/postgres/student_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use registrar_core::domain::{Student, ValidatedStudent};
use registrar_core::error::DomainError;
use registrar_core::repositories::StudentRepository;

use super::is_unique_violation;

pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct StudentRow {
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub email: String,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub enrollment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            student_id: row.student_id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            email: row.email,
            phone: row.phone,
            major: row.major,
            enrollment_date: row.enrollment_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn create(&self, student: &ValidatedStudent) -> Result<Student, DomainError> {
        let student = student.student();

        let row: StudentRow = sqlx::query_as(
            r#"
            INSERT INTO students (
                student_id, first_name, last_name, date_of_birth,
                email, phone, major, enrollment_date,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING
                student_id, first_name, last_name, date_of_birth,
                email, phone, major, enrollment_date,
                created_at, updated_at
            "#
        )
        .bind(student.student_id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(student.date_of_birth)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.major)
        .bind(student.enrollment_date)
        .bind(student.created_at)
        .bind(student.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            if is_unique_violation(&e) {
                DomainError::StudentAlreadyExists(student.student_id)
            } else {
                error!("Database error creating student: {}", e);
                DomainError::Database(e.to_string())
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Student>, DomainError> {
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            SELECT
                student_id, first_name, last_name, date_of_birth,
                email, phone, major, enrollment_date,
                created_at, updated_at
            FROM students
            WHERE student_id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding student by id: {}", e);
            DomainError::Database(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_all(&self) -> Result<Vec<Student>, DomainError> {
        let rows: Vec<StudentRow> = sqlx::query_as(
            r#"
            SELECT
                student_id, first_name, last_name, date_of_birth,
                email, phone, major, enrollment_date,
                created_at, updated_at
            FROM students
            ORDER BY created_at, student_id
            "#
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing students: {}", e);
            DomainError::Database(e.to_string())
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, student: &ValidatedStudent) -> Result<Student, DomainError> {
        let student = student.student();

        // Only the mutable columns are written
        let row: Option<StudentRow> = sqlx::query_as(
            r#"
            UPDATE students
            SET
                date_of_birth = $2,
                phone = $3,
                major = $4,
                updated_at = $5
            WHERE student_id = $1
            RETURNING
                student_id, first_name, last_name, date_of_birth,
                email, phone, major, enrollment_date,
                created_at, updated_at
            "#
        )
        .bind(student.student_id)
        .bind(student.date_of_birth)
        .bind(&student.phone)
        .bind(&student.major)
        .bind(student.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error updating student: {}", e);
            DomainError::Database(e.to_string())
        })?;

        row.map(Into::into)
            .ok_or(DomainError::StudentNotFound(student.student_id))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM students WHERE student_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| {
                error!("Database error deleting student: {}", e);
                DomainError::Database(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StudentNotFound(*id));
        }

        info!("Student row deleted: {}", id);
        Ok(())
    }
}
