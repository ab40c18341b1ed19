//! In-memory local repository implementation.
//!
//! This module provides a local implementation of [`CelestialObjectRepository`]
//! suitable for unit testing and local development. Rows live in a `BTreeMap`
//! keyed by id, so every listing comes back in id order without sorting.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{CelestialObject, CelestialObjectId, CelestialObjectPayload};

/// In-memory local repository.
///
/// Cloning is cheap and every clone shares the same underlying table.
///
/// # Example
/// ```
/// use starchart::db::repositories::LocalRepository;
/// use starchart::db::repository::CelestialObjectRepository;
/// use starchart::models::CelestialObjectPayload;
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// let sun = repo
///     .insert(&CelestialObjectPayload {
///         name: "Sun".to_string(),
///         orbital_period: None,
///         orbited_object_id: None,
///     })
///     .await
///     .unwrap();
/// assert_eq!(sun.id.value(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    read_queries: Arc<AtomicU64>,
}

struct LocalData {
    objects: BTreeMap<CelestialObjectId, CelestialObject>,

    // Ids are never reused, even after deletes
    next_id: i32,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            read_queries: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Store a row with a caller-chosen id, bypassing id assignment.
    ///
    /// This is a helper for seeding fixtures that need specific ids (or
    /// dangling parent references). The id counter is moved past `object.id`.
    pub fn seed(&self, object: CelestialObject) {
        let mut data = self.data.write();
        data.next_id = data.next_id.max(object.id.value().saturating_add(1));
        data.objects.insert(object.id, object.detached());
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
        self.read_queries.store(0, Ordering::Relaxed);
    }

    /// Get the number of objects stored.
    pub fn object_count(&self) -> usize {
        self.data.read().objects.len()
    }

    /// Check if an object exists.
    pub fn has_object(&self, id: CelestialObjectId) -> bool {
        self.data.read().objects.contains_key(&id)
    }

    /// Number of read queries served so far.
    pub fn read_query_count(&self) -> u64 {
        self.read_queries.load(Ordering::Relaxed)
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection("Local repository is unhealthy"))
        }
    }

    /// Run a read-only filter over the table, counting it as one query.
    fn select<P>(&self, predicate: P) -> RepositoryResult<Vec<CelestialObject>>
    where
        P: Fn(&CelestialObject) -> bool,
    {
        self.check_health()?;
        self.read_queries.fetch_add(1, Ordering::Relaxed);
        let data = self.data.read();
        Ok(data
            .objects
            .values()
            .filter(|object| predicate(object))
            .cloned()
            .collect())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CelestialObjectRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn find(&self, id: CelestialObjectId) -> RepositoryResult<Option<CelestialObject>> {
        self.check_health()?;
        self.read_queries.fetch_add(1, Ordering::Relaxed);
        Ok(self.data.read().objects.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<CelestialObject>> {
        self.select(|object| object.name == name)
    }

    async fn find_satellites(
        &self,
        id: CelestialObjectId,
    ) -> RepositoryResult<Vec<CelestialObject>> {
        self.select(|object| object.orbits(id))
    }

    async fn list_all(&self) -> RepositoryResult<Vec<CelestialObject>> {
        self.select(|_| true)
    }

    async fn insert(&self, payload: &CelestialObjectPayload) -> RepositoryResult<CelestialObject> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = CelestialObjectId::new(data.next_id);
        // The counter saturates at i32::MAX; never overwrite a stored row
        if data.objects.contains_key(&id) {
            return Err(RepositoryError::internal_with_context(
                "Celestial object id space exhausted",
                ErrorContext::new("insert").with_entity_id(id),
            ));
        }
        data.next_id = data.next_id.saturating_add(1);

        let object = CelestialObject::new(id, payload.clone());
        data.objects.insert(id, object.clone());
        Ok(object)
    }

    async fn update(&self, object: &CelestialObject) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        match data.objects.get_mut(&object.id) {
            Some(stored) => {
                stored.name = object.name.clone();
                stored.orbital_period = object.orbital_period;
                stored.orbited_object_id = object.orbited_object_id;
                Ok(())
            }
            None => Err(RepositoryError::not_found_with_context(
                format!("Celestial object {} not found", object.id),
                ErrorContext::new("update")
                    .with_entity("celestial_object")
                    .with_entity_id(object.id),
            )),
        }
    }

    async fn delete_many(&self, ids: &[CelestialObjectId]) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        Ok(ids
            .iter()
            .filter(|id| data.objects.remove(*id).is_some())
            .count())
    }
}
