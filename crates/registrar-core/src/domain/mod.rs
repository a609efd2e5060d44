//! # Registrar Core - Domain Module
//! 
//! Domain entities for the registrar application.

pub mod student;
pub mod validated_student;
pub mod idempotency_record;

pub use student::Student;
pub use validated_student::ValidatedStudent;
pub use idempotency_record::IdempotencyRecord;
