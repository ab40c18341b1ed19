//! Persistence interface for celestial objects.
//!
//! The trait mirrors the handful of primitives the service needs: find by key,
//! two predicate queries, insert, update and a ranged delete. Every mutating
//! call is committed before it returns.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{CelestialObject, CelestialObjectId, CelestialObjectPayload};

/// Repository trait for the celestial object table.
///
/// Objects returned by any read carry an empty `satellites` list; relationship
/// resolution belongs to the service layer.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait CelestialObjectRepository: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if connection is healthy
    /// - `Ok(false)` if connection is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if an error occurred during the check
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Reads ====================

    /// Find an object by primary key.
    ///
    /// # Returns
    /// * `Ok(Some(object))` - The stored row
    /// * `Ok(None)` - If no row has this id
    async fn find(&self, id: CelestialObjectId) -> RepositoryResult<Option<CelestialObject>>;

    /// All objects whose name is exactly `name` (case-sensitive), ordered by id.
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<CelestialObject>>;

    /// All objects directly orbiting `id`, ordered by id.
    ///
    /// The parent row does not need to exist.
    async fn find_satellites(
        &self,
        id: CelestialObjectId,
    ) -> RepositoryResult<Vec<CelestialObject>>;

    /// Every stored object, ordered by id.
    async fn list_all(&self) -> RepositoryResult<Vec<CelestialObject>>;

    // ==================== Writes ====================

    /// Insert a new object. Storage assigns the id.
    ///
    /// # Returns
    /// * `Ok(CelestialObject)` - The stored row including its assigned id
    async fn insert(&self, payload: &CelestialObjectPayload) -> RepositoryResult<CelestialObject>;

    /// Overwrite `name`, `orbital_period` and `orbited_object_id` of the row
    /// identified by `object.id`.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the row does not exist (anymore)
    async fn update(&self, object: &CelestialObject) -> RepositoryResult<()>;

    /// Delete every row whose id is in `ids`, in one transaction.
    ///
    /// Ids without a row are skipped silently.
    ///
    /// # Returns
    /// * `Ok(n)` - Number of rows removed
    async fn delete_many(&self, ids: &[CelestialObjectId]) -> RepositoryResult<usize>;
}
