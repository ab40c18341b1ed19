//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
///
/// | Method | Path | Handler |
/// |---|---|---|
/// | GET | `/` | [`handlers::get_all`] |
/// | POST | `/` | [`handlers::create`] |
/// | GET | `/{id}` or `/{name}` | [`handlers::get_by_key`] |
/// | PUT | `/{id}` | [`handlers::update`] |
/// | DELETE | `/{id}` | [`handlers::delete`] |
/// | PATCH | `/{id}/{name}` | [`handlers::rename_object`] |
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::get_all).post(handlers::create))
        .route(
            "/{key}",
            get(handlers::get_by_key)
                .put(handlers::update)
                .delete(handlers::delete),
        )
        .route("/{id}/{name}", patch(handlers::rename_object))
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
