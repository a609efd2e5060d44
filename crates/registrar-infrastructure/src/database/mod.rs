//! Database module (PostgreSQL and in-memory adapters)

pub mod connection;
pub mod memory;
pub mod migrations;
pub mod postgres;

pub use connection::create_pool;
pub use memory::{InMemoryIdempotencyRepository, InMemoryStudentRepository};
pub use migrations::run_migrations;
pub use postgres::{PgIdempotencyRepository, PgStudentRepository};
