//! Expanded tests for LocalRepository.
//!
//! These tests cover concurrent access patterns, edge cases and error
//! conditions for the in-memory local repository implementation.

use std::collections::HashSet;
use std::sync::Arc;

use starchart::db::repositories::LocalRepository;
use starchart::db::repository::CelestialObjectRepository;
use starchart::models::{CelestialObject, CelestialObjectId, CelestialObjectPayload};

fn payload(name: &str, parent: Option<i32>) -> CelestialObjectPayload {
    CelestialObjectPayload {
        name: name.to_string(),
        orbital_period: None,
        orbited_object_id: parent.map(CelestialObjectId::new),
    }
}

// =========================================================
// Concurrent Access Tests
// =========================================================

#[tokio::test]
async fn test_concurrent_inserts_get_distinct_ids() {
    let repo = Arc::new(LocalRepository::new());

    let mut handles = vec![];
    for i in 0..20 {
        let repo_clone = Arc::clone(&repo);
        let handle = tokio::spawn(async move {
            repo_clone
                .insert(&payload(&format!("asteroid_{}", i), None))
                .await
        });
        handles.push(handle);
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let created = handle.await.unwrap().unwrap();
        ids.insert(created.id);
    }

    assert_eq!(ids.len(), 20);
    assert_eq!(repo.list_all().await.unwrap().len(), 20);
}

#[tokio::test]
async fn test_concurrent_reads_and_writes() {
    let repo = Arc::new(LocalRepository::new());
    let sun_id = repo.insert(&payload("Sun", None)).await.unwrap().id;

    let mut read_handles = vec![];
    let mut write_handles = vec![];

    for _ in 0..10 {
        let repo_clone = Arc::clone(&repo);
        read_handles.push(tokio::spawn(async move {
            repo_clone.find_satellites(sun_id).await
        }));
    }

    for i in 0..5 {
        let repo_clone = Arc::clone(&repo);
        write_handles.push(tokio::spawn(async move {
            repo_clone
                .insert(&payload(&format!("planet_{}", i), Some(1)))
                .await
        }));
    }

    for handle in read_handles {
        assert!(handle.await.unwrap().is_ok());
    }
    for handle in write_handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(repo.find_satellites(sun_id).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_concurrent_health_checks() {
    let repo = Arc::new(LocalRepository::new());

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let repo_clone = Arc::clone(&repo);
            tokio::spawn(async move { repo_clone.health_check().await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap());
    }
}

// =========================================================
// Edge Case Tests
// =========================================================

#[tokio::test]
async fn test_names_are_stored_verbatim() {
    let repo = LocalRepository::new();
    let odd = "  Comet C/2020 F3 (NEOWISE) ★ ";
    repo.insert(&payload(odd, None)).await.unwrap();

    let found = repo.find_by_name(odd).await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(repo.find_by_name(odd.trim()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_self_orbit_is_accepted() {
    let repo = LocalRepository::new();
    repo.seed(CelestialObject::new(
        CelestialObjectId::new(1),
        payload("Ouroboros", Some(1)),
    ));

    let satellites = repo.find_satellites(CelestialObjectId::new(1)).await.unwrap();
    assert_eq!(satellites.len(), 1);
    assert_eq!(satellites[0].id, CelestialObjectId::new(1));
}

#[tokio::test]
async fn test_stored_rows_never_carry_satellites() {
    let repo = LocalRepository::new();
    let child = CelestialObject::new(CelestialObjectId::new(2), payload("Moon", Some(1)));
    let parent = CelestialObject::new(CelestialObjectId::new(1), payload("Earth", None))
        .with_satellites(vec![child]);

    repo.seed(parent);
    let stored = repo.find(CelestialObjectId::new(1)).await.unwrap().unwrap();
    assert!(stored.satellites.is_empty());
    assert_eq!(repo.object_count(), 1);
}

#[tokio::test]
async fn test_update_does_not_touch_id() {
    let repo = LocalRepository::new();
    let mut earth = repo.insert(&payload("Earth", None)).await.unwrap();
    earth.name = "Terra".to_string();
    repo.update(&earth).await.unwrap();

    let stored = repo.list_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, earth.id);
    assert_eq!(stored[0].name, "Terra");
}

#[tokio::test]
async fn test_delete_many_with_empty_slice() {
    let repo = LocalRepository::new();
    repo.insert(&payload("Sun", None)).await.unwrap();

    assert_eq!(repo.delete_many(&[]).await.unwrap(), 0);
    assert_eq!(repo.object_count(), 1);
}

// =========================================================
// Error Condition Tests
// =========================================================

#[tokio::test]
async fn test_unhealthy_repository_rejects_every_operation() {
    let repo = LocalRepository::new();
    let sun = repo.insert(&payload("Sun", None)).await.unwrap();
    repo.set_healthy(false);

    assert!(repo.find(sun.id).await.is_err());
    assert!(repo.find_by_name("Sun").await.is_err());
    assert!(repo.find_satellites(sun.id).await.is_err());
    assert!(repo.list_all().await.is_err());
    assert!(repo.insert(&payload("Moon", Some(1))).await.is_err());
    assert!(repo.update(&sun).await.is_err());
    assert!(repo.delete_many(&[sun.id]).await.is_err());

    let err = repo.list_all().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_health_check_transitions() {
    let repo = LocalRepository::new();
    assert!(repo.health_check().await.unwrap());

    repo.set_healthy(false);
    assert!(!repo.health_check().await.unwrap());

    repo.set_healthy(true);
    assert!(repo.health_check().await.unwrap());
    assert!(repo.list_all().await.is_ok());
}

#[tokio::test]
async fn test_clear_keeps_health_state() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);
    repo.clear();

    assert!(!repo.health_check().await.unwrap());
}
