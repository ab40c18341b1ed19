//! # StarChart Backend
//!
//! A catalogue of celestial objects served over a small REST API. Every object
//! may orbit another one; reads return each object together with the objects
//! directly orbiting it (its *satellites*).
//!
//! ## Architecture
//!
//! - [`models`]: The `CelestialObject` entity and satellite resolution
//! - [`db`]: Repository pattern, storage backends and the celestial object service
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Storage backends
//!
//! - `local-repo` (default): in-memory, for tests and local development
//! - `postgres-repo`: PostgreSQL through Diesel with pooled connections

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod db;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
