//! Backend selection.
//!
//! Turns a [`RepositoryType`] plus whatever configuration source is at hand
//! (environment, `repository.toml`, an explicit [`PostgresConfig`]) into a
//! [`SharedRepository`] ready to hand to the HTTP layer.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{CelestialObjectRepository, RepositoryError, RepositoryResult};
use super::PostgresConfig;

/// Shared handle to whichever backend was selected.
pub type SharedRepository = Arc<dyn CelestialObjectRepository>;

/// Storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Diesel over PostgreSQL
    Postgres,
    /// In-memory tables
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Accepts `postgres`, `pg` or `local`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Backend named by `REPOSITORY_TYPE`.
    ///
    /// Without that variable, a `DATABASE_URL` or `PG_DATABASE_URL` selects
    /// Postgres and anything else falls back to Local. An unparsable
    /// `REPOSITORY_TYPE` also means Local.
    pub fn from_env() -> Self {
        match std::env::var("REPOSITORY_TYPE") {
            Ok(name) => name.parse().unwrap_or(Self::Local),
            Err(_) if has_database_url() => Self::Postgres,
            Err(_) => Self::Local,
        }
    }
}

fn has_database_url() -> bool {
    ["DATABASE_URL", "PG_DATABASE_URL"]
        .iter()
        .any(|key| std::env::var(key).is_ok())
}

#[cfg(feature = "postgres-repo")]
fn postgres_config_from_env() -> RepositoryResult<PostgresConfig> {
    PostgresConfig::from_env().map_err(RepositoryError::configuration)
}

#[cfg(not(feature = "postgres-repo"))]
fn postgres_config_from_env() -> RepositoryResult<PostgresConfig> {
    Err(postgres_disabled())
}

#[cfg(not(feature = "postgres-repo"))]
fn postgres_disabled() -> RepositoryError {
    RepositoryError::configuration("postgres-repo feature not enabled")
}

/// Entry points for building a repository.
///
/// # Example
/// ```ignore
/// use starchart::db::{PostgresConfig, RepositoryFactory, RepositoryType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = PostgresConfig::with_url("postgres://localhost/starchart");
///     let _pg = RepositoryFactory::create(RepositoryType::Postgres, Some(&config)).await?;
///
///     let _memory = RepositoryFactory::create_local();
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Build a backend of `repo_type`. Postgres needs `postgres_config`.
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<SharedRepository> {
        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            #[cfg(feature = "postgres-repo")]
            RepositoryType::Postgres => {
                let config = postgres_config.ok_or_else(|| {
                    RepositoryError::configuration("Postgres backend requires PostgresConfig")
                })?;
                let repo: SharedRepository = Self::create_postgres(config).await?;
                Ok(repo)
            }
            #[cfg(not(feature = "postgres-repo"))]
            RepositoryType::Postgres => {
                let _ = postgres_config;
                Err(postgres_disabled())
            }
        }
    }

    /// Connect to Postgres and apply migrations.
    ///
    /// Both steps block, so they run on the blocking pool.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    /// Fresh, empty in-memory backend.
    pub fn create_local() -> SharedRepository {
        Arc::new(LocalRepository::new())
    }

    /// Backend chosen by [`RepositoryType::from_env`], configured from the
    /// `DATABASE_URL` / `PG_*` variables when it is Postgres.
    pub async fn from_env() -> RepositoryResult<SharedRepository> {
        let repo_type = RepositoryType::from_env();
        let postgres_config = match repo_type {
            RepositoryType::Postgres => Some(postgres_config_from_env()?),
            RepositoryType::Local => None,
        };
        Self::create(repo_type, postgres_config.as_ref()).await
    }

    /// Backend described by a TOML file at `config_path`.
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<SharedRepository> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Backend described by the first `repository.toml` found in
    /// [`RepositoryConfig::default_locations`].
    pub async fn from_default_config() -> RepositoryResult<SharedRepository> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config).await
    }

    /// Backend described by an already-parsed configuration.
    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<SharedRepository> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;
        let postgres_config = config.to_postgres_config()?;
        Self::create(repo_type, postgres_config.as_ref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!(
            RepositoryType::from_str("local").unwrap(),
            RepositoryType::Local
        );
        assert_eq!(
            RepositoryType::from_str("postgres").unwrap(),
            RepositoryType::Postgres
        );
        assert_eq!(
            RepositoryType::from_str("Pg").unwrap(),
            RepositoryType::Postgres
        );
        assert!(RepositoryType::from_str("invalid").is_err());
    }

    #[tokio::test]
    async fn test_create_local_repository() {
        let repo = RepositoryFactory::create_local();
        assert!(repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_local_config_ignores_postgres_table() {
        let config = RepositoryConfig::from_toml_str(
            "[repository]\ntype = \"local\"\n\n[postgres]\ndatabase_url = \"postgres://x\"\n",
        )
        .unwrap();

        let repo = RepositoryFactory::from_repository_config(&config)
            .await
            .unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[cfg(not(feature = "postgres-repo"))]
    #[tokio::test]
    async fn test_postgres_without_feature_is_configuration_error() {
        let result = RepositoryFactory::create(RepositoryType::Postgres, None).await;
        assert!(matches!(
            result,
            Err(RepositoryError::ConfigurationError { .. })
        ));
    }
}
