//! High-level celestial object service.
//!
//! Repository-agnostic operations behind the REST API. Each function takes the
//! repository explicitly, checks existence first, then resolves the orbit
//! relationship one level deep before returning.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTTP handlers)                       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                             │
//! │  - NotFound signalling                                   │
//! │  - Satellite resolution                                  │
//! │  - Shallow cascade delete                                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  CelestialObjectRepository (repository/)                 │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Postgres (Diesel)│     │ Local Repository        │
//! │                  │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use starchart::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!
//!     match services::get_all(&repo).await {
//!         Ok(objects) => println!("Found {} objects", objects.len()),
//!         Err(e) if e.is_not_found() => println!("Catalogue is empty"),
//!         Err(e) => return Err(e.into()),
//!     }
//!     Ok(())
//! }
//! ```

use log::{debug, info};

use super::repository::{
    CelestialObjectRepository, ErrorContext, RepositoryError, RepositoryResult,
};
use crate::models::{
    attach_satellites, CelestialObject, CelestialObjectId, CelestialObjectPayload,
};

const ENTITY: &str = "celestial_object";

fn not_found(operation: &str, id: CelestialObjectId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Celestial object {} not found", id),
        ErrorContext::new(operation)
            .with_entity(ENTITY)
            .with_entity_id(id),
    )
}

/// Load an object or fail with NotFound.
async fn require<R>(repo: &R, id: CelestialObjectId, operation: &str) -> RepositoryResult<CelestialObject>
where
    R: CelestialObjectRepository + ?Sized,
{
    repo.find(id)
        .await?
        .ok_or_else(|| not_found(operation, id))
}

// ==================== Health & Connection ====================

/// Check if the storage backend is healthy.
pub async fn health_check<R>(repo: &R) -> RepositoryResult<bool>
where
    R: CelestialObjectRepository + ?Sized,
{
    repo.health_check().await
}

// ==================== Reads ====================

/// Fetch one object with its direct satellites.
///
/// # Returns
/// * `Ok(CelestialObject)` - The object, `satellites` filled one level deep
/// * `Err(RepositoryError::NotFound)` - If no object has this id
pub async fn get_by_id<R>(repo: &R, id: CelestialObjectId) -> RepositoryResult<CelestialObject>
where
    R: CelestialObjectRepository + ?Sized,
{
    let object = require(repo, id, "get_by_id").await?;
    let satellites = repo.find_satellites(id).await?;
    debug!("Object {} has {} satellites", id, satellites.len());

    Ok(object.with_satellites(satellites))
}

/// Fetch every object named exactly `name`, each with its direct satellites.
///
/// # Returns
/// * `Err(RepositoryError::NotFound)` - If no object has this name
pub async fn get_by_name<R>(repo: &R, name: &str) -> RepositoryResult<Vec<CelestialObject>>
where
    R: CelestialObjectRepository + ?Sized,
{
    let matches = repo.find_by_name(name).await?;
    if matches.is_empty() {
        return Err(RepositoryError::not_found_with_context(
            format!("No celestial object named '{}'", name),
            ErrorContext::new("get_by_name")
                .with_entity(ENTITY)
                .with_details(format!("name={}", name)),
        ));
    }

    let mut resolved = Vec::with_capacity(matches.len());
    for object in matches {
        let satellites = repo.find_satellites(object.id).await?;
        resolved.push(object.with_satellites(satellites));
    }
    Ok(resolved)
}

/// Fetch the whole catalogue with satellites attached.
///
/// Satellites are resolved from the single listing, without one query per
/// object. An empty catalogue is reported as NotFound rather than an empty
/// list; HTTP callers rely on the 404.
pub async fn get_all<R>(repo: &R) -> RepositoryResult<Vec<CelestialObject>>
where
    R: CelestialObjectRepository + ?Sized,
{
    let objects = repo.list_all().await?;
    if objects.is_empty() {
        return Err(RepositoryError::not_found_with_context(
            "No celestial objects stored",
            ErrorContext::new("get_all").with_entity(ENTITY),
        ));
    }

    Ok(attach_satellites(objects))
}

// ==================== Writes ====================

/// Store a new object. The repository assigns its id.
pub async fn create<R>(repo: &R, payload: &CelestialObjectPayload) -> RepositoryResult<CelestialObject>
where
    R: CelestialObjectRepository + ?Sized,
{
    let created = repo.insert(payload).await?;
    info!("Created celestial object {} ('{}')", created.id, created.name);
    Ok(created)
}

/// Overwrite name, orbital period and orbited object of an existing object.
///
/// # Returns
/// * `Err(RepositoryError::NotFound)` - If no object has this id; nothing is written
pub async fn update<R>(
    repo: &R,
    id: CelestialObjectId,
    payload: CelestialObjectPayload,
) -> RepositoryResult<()>
where
    R: CelestialObjectRepository + ?Sized,
{
    let mut object = require(repo, id, "update").await?;
    object.apply(payload);
    repo.update(&object).await?;

    info!("Updated celestial object {}", id);
    Ok(())
}

/// Change only the name of an existing object.
pub async fn rename_object<R>(repo: &R, id: CelestialObjectId, name: &str) -> RepositoryResult<()>
where
    R: CelestialObjectRepository + ?Sized,
{
    let mut object = require(repo, id, "rename_object").await?;
    object.name = name.to_string();
    repo.update(&object).await?;

    info!("Renamed celestial object {} to '{}'", id, name);
    Ok(())
}

/// Delete an object and its direct satellites.
///
/// The cascade stops after one level: grandchildren stay and keep pointing at
/// the removed satellite. Satellites are removed even when the target row
/// itself is already gone.
///
/// # Returns
/// * `Ok(n)` - Number of rows removed
/// * `Err(RepositoryError::NotFound)` - If neither the target nor any satellite exists
pub async fn delete<R>(repo: &R, id: CelestialObjectId) -> RepositoryResult<usize>
where
    R: CelestialObjectRepository + ?Sized,
{
    let satellites = repo.find_satellites(id).await?;
    let target = repo.find(id).await?;

    if target.is_none() && satellites.is_empty() {
        return Err(not_found("delete", id));
    }

    let mut ids: Vec<CelestialObjectId> = satellites.iter().map(|s| s.id).collect();
    if let Some(target) = &target {
        ids.push(target.id);
    }

    let removed = repo.delete_many(&ids).await?;
    info!(
        "Deleted celestial object {} with {} direct satellites ({} rows)",
        id,
        satellites.len(),
        removed
    );
    Ok(removed)
}
