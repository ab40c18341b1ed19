//! Tests for db::factory module - repository creation and configuration.

mod support;

use std::io::Write;
use std::str::FromStr;

use starchart::db::factory::{RepositoryFactory, RepositoryType};
use starchart::db::{CelestialObjectRepository, RepositoryConfig, RepositoryError};

#[test]
fn test_repository_type_from_str_postgres() {
    let rt = RepositoryType::from_str("postgres").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);

    let rt = RepositoryType::from_str("POSTGRES").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);

    let rt = RepositoryType::from_str("pg").unwrap();
    assert_eq!(rt, RepositoryType::Postgres);
}

#[test]
fn test_repository_type_from_str_local() {
    let rt = RepositoryType::from_str("local").unwrap();
    assert_eq!(rt, RepositoryType::Local);

    let rt = RepositoryType::from_str("LOCAL").unwrap();
    assert_eq!(rt, RepositoryType::Local);
}

#[test]
fn test_repository_type_from_str_invalid() {
    let result = RepositoryType::from_str("invalid");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            let rt = RepositoryType::from_env();
            assert_eq!(rt, RepositoryType::Local);
        },
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/test")),
        ],
        || {
            let rt = RepositoryType::from_env();
            assert_eq!(rt, RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_repository_type_from_env_with_pg_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", Some("postgres://localhost/test")),
        ],
        || {
            let rt = RepositoryType::from_env();
            assert_eq!(rt, RepositoryType::Postgres);
        },
    );
}

#[test]
fn test_repository_type_from_env_explicit() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("local"))], || {
        let rt = RepositoryType::from_env();
        assert_eq!(rt, RepositoryType::Local);
    });
}

#[test]
fn test_repository_type_from_env_explicit_postgres() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("postgres"))], || {
        let rt = RepositoryType::from_env();
        assert_eq!(rt, RepositoryType::Postgres);
    });
}

#[test]
fn test_repository_type_from_env_invalid_defaults_to_local() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("invalid")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            let rt = RepositoryType::from_env();
            assert_eq!(rt, RepositoryType::Local);
        },
    );
}

#[tokio::test]
async fn test_create_local_repository_is_empty_and_healthy() {
    let repo = RepositoryFactory::create_local();
    assert!(repo.health_check().await.unwrap());
    assert!(repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_local_via_factory() {
    let result = RepositoryFactory::create(RepositoryType::Local, None).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_local_instances_do_not_share_state() {
    let a = RepositoryFactory::create_local();
    let b = RepositoryFactory::create_local();

    a.insert(&starchart::models::CelestialObjectPayload {
        name: "Sun".to_string(),
        orbital_period: None,
        orbited_object_id: None,
    })
    .await
    .unwrap();

    assert_eq!(a.list_all().await.unwrap().len(), 1);
    assert!(b.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_from_config_file_local() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_from_config_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let result = RepositoryFactory::from_config_file(dir.path().join("repository.toml")).await;
    assert!(matches!(
        result,
        Err(RepositoryError::ConfigurationError { .. })
    ));
}

#[tokio::test]
async fn test_from_repository_config_rejects_unknown_type() {
    let config = RepositoryConfig::from_toml_str("[repository]\ntype = \"mongo\"\n").unwrap();
    let result = RepositoryFactory::from_repository_config(&config).await;

    let err = result.err().unwrap();
    assert!(err.to_string().contains("Invalid repository type"));
}

#[cfg(not(feature = "postgres-repo"))]
#[test]
fn test_from_env_postgres_without_feature_fails() {
    support::with_scoped_env(&[("REPOSITORY_TYPE", Some("postgres"))], || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(RepositoryFactory::from_env());
        assert!(matches!(
            result,
            Err(RepositoryError::ConfigurationError { .. })
        ));
    });
}

#[cfg(feature = "postgres-repo")]
#[test]
fn test_from_env_postgres_without_url_fails() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("postgres")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let result = runtime.block_on(RepositoryFactory::from_env());
            let err = result.err().unwrap();
            assert!(err.to_string().contains("DATABASE_URL"));
        },
    );
}

#[cfg(feature = "postgres-repo")]
#[tokio::test]
async fn test_create_postgres_without_config_fails() {
    let result = RepositoryFactory::create(RepositoryType::Postgres, None).await;
    assert!(result.is_err());
    assert!(result
        .err()
        .unwrap()
        .to_string()
        .contains("requires PostgresConfig"));
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_create_postgres_without_feature_fails() {
    let result = RepositoryFactory::create(RepositoryType::Postgres, None).await;
    assert!(result.is_err());
    let err = result.err().unwrap();
    assert!(err.to_string().contains("feature not enabled"));
}

#[test]
fn test_repository_type_partial_eq() {
    assert_eq!(RepositoryType::Local, RepositoryType::Local);
    assert_eq!(RepositoryType::Postgres, RepositoryType::Postgres);
    assert_ne!(RepositoryType::Local, RepositoryType::Postgres);
}
