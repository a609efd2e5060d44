// ============================================================================
// Registrar Core - Student Entity
// File: crates/registrar-core/src/domain/student.rs
// Description: Student entity and its invariant checks
// ============================================================================

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Lowercase only; mixed-case addresses are rejected.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("email pattern compiles")
});

/// Student entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub email: String,
    pub phone: Option<String>,
    pub major: Option<String>,
    pub enrollment_date: DateTime<Utc>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A timestamp equal to the zero value counts as "not set".
fn is_unset(value: &DateTime<Utc>) -> bool {
    *value == DateTime::<Utc>::default()
}

impl Student {
    /// Create a new student with a fresh id. Does not validate.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        first_name: String,
        last_name: String,
        date_of_birth: Option<DateTime<Utc>>,
        email: String,
        phone: Option<String>,
        major: Option<String>,
        enrollment_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            student_id: Uuid::new_v4(),
            first_name,
            last_name,
            date_of_birth,
            email,
            phone,
            major,
            enrollment_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check every invariant in a fixed order; the first failure wins.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.first_name.is_empty() {
            return Err(DomainError::validation("Must have first name."));
        }

        if self.last_name.is_empty() {
            return Err(DomainError::validation("Must have last name."));
        }

        if self.student_id.is_nil() {
            return Err(DomainError::validation("Student ID can't be nil"));
        }

        if self.email.is_empty() {
            return Err(DomainError::validation("Email can't be empty"));
        }

        if !EMAIL_REGEX.is_match(&self.email) {
            return Err(DomainError::validation("Invalid email"));
        }

        if is_unset(&self.enrollment_date) {
            return Err(DomainError::validation("The enrollment date can't be zero"));
        }

        if matches!(self.date_of_birth, Some(dob) if dob > now) {
            return Err(DomainError::validation("Invalid date of birth"));
        }

        if matches!(self.phone.as_deref(), Some("")) {
            return Err(DomainError::validation(
                "Phone cannot be an empty string if provided",
            ));
        }

        if matches!(self.major.as_deref(), Some("")) {
            return Err(DomainError::validation(
                "The major cannot be an empty string if provided",
            ));
        }

        if is_unset(&self.created_at) {
            return Err(DomainError::validation(
                "CreatedAt is required and cannot be zero",
            ));
        }

        if is_unset(&self.updated_at) {
            return Err(DomainError::validation(
                "UpdatedAt is required and cannot be zero",
            ));
        }

        Ok(())
    }

    /// Replace the mutable fields (absent clears), touch `updated_at` and
    /// re-validate.
    pub fn update_fields(
        &mut self,
        date_of_birth: Option<DateTime<Utc>>,
        phone: Option<String>,
        major: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.date_of_birth = date_of_birth;
        self.phone = phone;
        self.major = major;
        self.updated_at = now;

        self.validate(now)
    }
}
