//! Repository trait definitions for database operations.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`celestial_object`]: Persistence interface for the celestial object table
//!
//! The service layer only talks to these traits, so backends can be swapped
//! without touching business logic:
//!
//! ```ignore
//! async fn count_roots<R: CelestialObjectRepository + ?Sized>(repo: &R) -> RepositoryResult<usize> {
//!     let all = repo.list_all().await?;
//!     Ok(all.iter().filter(|o| o.orbited_object_id.is_none()).count())
//! }
//! ```

pub mod celestial_object;
pub mod error;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use celestial_object::CelestialObjectRepository;
