//! # Registrar Core
//! 
//! Student domain, repository traits (ports) and the idempotent command service.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
