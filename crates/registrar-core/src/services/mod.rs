//! Domain services (business logic)

pub mod commands;
pub mod student_service;

pub use commands::{
    CommandOutcome, CreateStudentCommand, CreateStudentCommandResult, StudentQueryListResult,
    StudentQueryResult, StudentResult, UpdateStudentCommand, UpdateStudentCommandResult,
};
pub use student_service::{StudentService, StudentUseCases};
