//! Request and response DTOs

pub mod date;
pub mod student;

pub use student::{CreateStudentRequest, StudentResponse, UpdateStudentRequest};
