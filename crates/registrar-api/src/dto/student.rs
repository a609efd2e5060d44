// ============================================================================
// Registrar API - Student DTOs
// File: crates/registrar-api/src/dto/student.rs
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use registrar_core::services::{CreateStudentCommand, StudentResult, UpdateStudentCommand};
use registrar_shared::constants::MAX_IDEMPOTENCY_KEY_LENGTH;

use super::date::deserialize_optional_date;

/// Create request payload - POST /api/v1/students
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[serde(default)]
    #[validate(length(max = MAX_IDEMPOTENCY_KEY_LENGTH))]
    pub idempotency_key: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub enrollment_date: Option<DateTime<Utc>>,
}

impl From<CreateStudentRequest> for CreateStudentCommand {
    fn from(req: CreateStudentRequest) -> Self {
        Self {
            idempotency_key: req.idempotency_key.unwrap_or_default(),
            first_name: req.first_name,
            last_name: req.last_name,
            date_of_birth: req.date_of_birth,
            email: req.email,
            phone: req.phone,
            major: req.major,
            // Left unset so the validator reports it
            enrollment_date: req.enrollment_date.unwrap_or_default(),
        }
    }
}

/// Update request payload - PUT /api/v1/students
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[serde(default)]
    #[validate(length(max = MAX_IDEMPOTENCY_KEY_LENGTH))]
    pub idempotency_key: Option<String>,
    pub student_id: Uuid,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
}

impl From<UpdateStudentRequest> for UpdateStudentCommand {
    fn from(req: UpdateStudentRequest) -> Self {
        Self {
            idempotency_key: req.idempotency_key.unwrap_or_default(),
            student_id: req.student_id,
            date_of_birth: req.date_of_birth,
            phone: req.phone,
            major: req.major,
        }
    }
}

/// Student DTO for responses
#[derive(Debug, Clone, Serialize)]
pub struct StudentResponse {
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

impl From<StudentResult> for StudentResponse {
    fn from(result: StudentResult) -> Self {
        Self {
            student_id: result.student_id,
            first_name: result.first_name,
            last_name: result.last_name,
            date_of_birth: result.date_of_birth,
            email: result.email,
            phone: result.phone,
            major: result.major,
            enrollment_date: result.enrollment_date,
            created_at: result.created_at,
            updated_at: result.updated_at,
        }
    }
}
