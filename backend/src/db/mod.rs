//! Database module for celestial object storage.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Repository Pattern
//! The module includes:
//! - `services`: The celestial object service (use these in your application!)
//! - `repository`: Trait definition for database operations
//! - `repositories::postgres`: Postgres implementation with Diesel ORM
//! - `repositories::local`: In-memory implementation for unit testing and local development
//! - `factory`: Factory for creating repository instances
//! - `repo_config`: `repository.toml` support
//!
//! # Recommended Usage
//!
//! ```ignore
//! use starchart::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let objects = services::get_all(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```
//!
//! There is no process-wide repository: callers build one through the factory
//! and hand it to whatever needs it.

// Feature flag priority: postgres > local
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;


// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use services::{
    create, delete, get_all, get_by_id, get_by_name, health_check, rename_object, update,
};

pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryFactory, RepositoryType, SharedRepository};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    CelestialObjectRepository, ErrorContext, RepositoryError, RepositoryResult,
};
