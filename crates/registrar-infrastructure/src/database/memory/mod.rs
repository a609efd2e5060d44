//! In-memory repository implementations
//!
//! Same contracts as the PostgreSQL adapters, including uniqueness of
//! student ids and idempotency keys. State lives for the process lifetime.

pub mod student_repo_impl;
pub mod idempotency_repo_impl;

pub use student_repo_impl::InMemoryStudentRepository;
pub use idempotency_repo_impl::InMemoryIdempotencyRepository;
