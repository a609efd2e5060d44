//! PostgreSQL repository implementations

pub mod student_repo_impl;
pub mod idempotency_repo_impl;

pub use student_repo_impl::PgStudentRepository;
pub use idempotency_repo_impl::PgIdempotencyRepository;

/// Postgres reports duplicate keys as SQLSTATE 23505.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}
