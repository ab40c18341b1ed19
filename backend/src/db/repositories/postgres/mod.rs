//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - `SELECT 1` health check
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::repository::{
    CelestialObjectRepository, ErrorContext, RepositoryError, RepositoryResult,
};
use crate::models::{CelestialObject, CelestialObjectId, CelestialObjectPayload};

mod models;
mod schema;

use models::*;
use schema::celestial_objects;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// See the module documentation for the variables read and their defaults.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Build the connection pool and apply pending migrations.
    ///
    /// Blocks the calling thread; async callers go through
    /// `RepositoryFactory::create_postgres`.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(ConnectionManager::<PgConnection>::new(&config.database_url))
            .map_err(|e| RepositoryError::from(e).with_operation("create_pool"))?;

        let mut conn = pool
            .get()
            .map_err(|e| RepositoryError::from(e).with_operation("run_migrations"))?;
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        drop(conn);

        log::info!(
            "Postgres repository ready (max_pool_size={}, max_retries={})",
            config.max_pool_size,
            config.max_retries
        );

        Ok(Self { pool, config })
    }

    /// Run `f` on a pooled connection inside the blocking thread pool.
    ///
    /// Retryable failures, whether checking out a connection or running `f`,
    /// are attempted again up to `max_retries` times with the delay doubling
    /// after each attempt.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        task::spawn_blocking(move || {
            let mut attempt = 0;
            loop {
                let result = pool
                    .get()
                    .map_err(RepositoryError::from)
                    .and_then(|mut conn| f.clone()(&mut conn));

                match result {
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        attempt += 1;
                        log::warn!(
                            "Retrying database operation (attempt {}/{}): {}",
                            attempt + 1,
                            max_retries + 1,
                            e
                        );
                        std::thread::sleep(delay);
                        delay *= 2;
                    }
                    other => return other,
                }
            }
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn load_objects(
    query: Result<Vec<CelestialObjectRow>, diesel::result::Error>,
) -> RepositoryResult<Vec<CelestialObject>> {
    query
        .map(|rows| rows.into_iter().map(CelestialObject::from).collect())
        .map_err(map_diesel_error)
}

#[async_trait]
impl CelestialObjectRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find(&self, id: CelestialObjectId) -> RepositoryResult<Option<CelestialObject>> {
        self.with_conn(move |conn| {
            celestial_objects::table
                .find(id.value())
                .select(CelestialObjectRow::as_select())
                .first::<CelestialObjectRow>(conn)
                .optional()
                .map(|row| row.map(CelestialObject::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Vec<CelestialObject>> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            load_objects(
                celestial_objects::table
                    .filter(celestial_objects::name.eq(&name))
                    .order(celestial_objects::id.asc())
                    .select(CelestialObjectRow::as_select())
                    .load::<CelestialObjectRow>(conn),
            )
        })
        .await
    }

    async fn find_satellites(
        &self,
        id: CelestialObjectId,
    ) -> RepositoryResult<Vec<CelestialObject>> {
        self.with_conn(move |conn| {
            load_objects(
                celestial_objects::table
                    .filter(celestial_objects::orbited_object_id.eq(id.value()))
                    .order(celestial_objects::id.asc())
                    .select(CelestialObjectRow::as_select())
                    .load::<CelestialObjectRow>(conn),
            )
        })
        .await
    }

    async fn list_all(&self) -> RepositoryResult<Vec<CelestialObject>> {
        self.with_conn(|conn| {
            load_objects(
                celestial_objects::table
                    .order(celestial_objects::id.asc())
                    .select(CelestialObjectRow::as_select())
                    .load::<CelestialObjectRow>(conn),
            )
        })
        .await
    }

    async fn insert(&self, payload: &CelestialObjectPayload) -> RepositoryResult<CelestialObject> {
        let row = NewCelestialObjectRow::from(payload);
        self.with_conn(move |conn| {
            diesel::insert_into(celestial_objects::table)
                .values(&row)
                .returning(CelestialObjectRow::as_returning())
                .get_result::<CelestialObjectRow>(conn)
                .map(CelestialObject::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update(&self, object: &CelestialObject) -> RepositoryResult<()> {
        let id = object.id;
        let changes = CelestialObjectChangeset::from(object);
        self.with_conn(move |conn| {
            let updated = diesel::update(celestial_objects::table.find(id.value()))
                .set(&changes)
                .execute(conn)
                .map_err(map_diesel_error)?;

            if updated == 0 {
                return Err(RepositoryError::not_found_with_context(
                    format!("Celestial object {} not found", id),
                    ErrorContext::new("update")
                        .with_entity("celestial_object")
                        .with_entity_id(id),
                ));
            }
            Ok(())
        })
        .await
    }

    async fn delete_many(&self, ids: &[CelestialObjectId]) -> RepositoryResult<usize> {
        let ids: Vec<i32> = ids.iter().map(|id| id.value()).collect();
        self.with_conn(move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                diesel::delete(celestial_objects::table.filter(celestial_objects::id.eq_any(ids)))
                    .execute(tx)
                    .map_err(map_diesel_error)
            })
        })
        .await
    }
}
