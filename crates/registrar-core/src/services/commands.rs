//! Command, query and result shapes exchanged with the student service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Student;

/// Create a student. An empty `idempotency_key` disables replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStudentCommand {
    pub idempotency_key: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub email: String,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub enrollment_date: DateTime<Utc>,
}

/// Replace date of birth, phone and major of an existing student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStudentCommand {
    pub idempotency_key: String,
    pub student_id: Uuid,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub phone: Option<String>,
    pub major: Option<String>,
}

/// Flat read model of a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentResult {
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub email: String,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub enrollment_date: DateTime<Utc>,
}

impl From<&Student> for StudentResult {
    fn from(student: &Student) -> Self {
        Self {
            student_id: student.student_id,
            first_name: student.first_name.clone(),
            last_name: student.last_name.clone(),
            date_of_birth: student.date_of_birth,
            email: student.email.clone(),
            phone: student.phone.clone(),
            major: student.major.clone(),
            created_at: student.created_at,
            updated_at: student.updated_at,
            enrollment_date: student.enrollment_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStudentCommandResult {
    pub result: StudentResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStudentCommandResult {
    pub result: StudentResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentQueryResult {
    pub result: StudentResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentQueryListResult {
    pub result: Vec<StudentResult>,
}

/// What a write command hands back: the result, the status to report and
/// whether it came from the idempotency store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome<T> {
    pub result: T,
    pub status_code: u16,
    pub replayed: bool,
}

impl<T> CommandOutcome<T> {
    pub fn executed(result: T, status_code: u16) -> Self {
        Self {
            result,
            status_code,
            replayed: false,
        }
    }

    pub fn replayed(result: T, status_code: u16) -> Self {
        Self {
            result,
            status_code,
            replayed: true,
        }
    }
}
