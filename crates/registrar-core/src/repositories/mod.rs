//! Repository traits (ports)

pub mod student_repository;
pub mod idempotency_repository;

pub use student_repository::StudentRepository;
pub use idempotency_repository::IdempotencyRepository;

#[cfg(test)]
pub use idempotency_repository::MockIdempotencyRepository;
#[cfg(test)]
pub use student_repository::MockStudentRepository;
