//! # Registrar Infrastructure
//! 
//! Store implementations (adapters): PostgreSQL and in-memory.

pub mod database;

pub use database::{
    create_pool, run_migrations, InMemoryIdempotencyRepository, InMemoryStudentRepository,
    PgIdempotencyRepository, PgStudentRepository,
};
