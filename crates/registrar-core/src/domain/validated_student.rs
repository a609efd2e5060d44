//! Validated student wrapper

use chrono::{DateTime, Utc};

use super::Student;
use crate::error::DomainError;

/// A student snapshot that passed validation when it was wrapped.
///
/// Only [`ValidatedStudent::new`] can build one, so stores accepting this type
/// never see an unchecked student. Mutating the inner value requires taking it
/// out with [`ValidatedStudent::into_inner`] and wrapping it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedStudent {
    student: Student,
    validated: bool,
}

impl ValidatedStudent {
    pub fn new(student: Student, now: DateTime<Utc>) -> Result<Self, DomainError> {
        student.validate(now)?;
        Ok(Self {
            student,
            validated: true,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.validated
    }

    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn into_inner(self) -> Student {
        self.student
    }
}
