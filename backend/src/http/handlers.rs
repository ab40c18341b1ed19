//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to one route and delegates to the celestial object
//! service in [`crate::db::services`].

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::error::AppError;
use super::state::AppState;
use crate::db::services;
use crate::models::{CelestialObject, CelestialObjectId, CelestialObjectPayload};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Relative location of an object, usable with `GET /{id}`.
pub fn object_location(id: CelestialObjectId) -> String {
    format!("/{}", id)
}

fn payload_from(
    body: Result<Json<CelestialObjectPayload>, JsonRejection>,
) -> Result<CelestialObjectPayload, AppError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

fn path_from<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// =============================================================================
// Reads
// =============================================================================

/// GET /
///
/// Every object with its direct satellites. 404 when the catalogue is empty.
pub async fn get_all(State(state): State<AppState>) -> HandlerResult<Vec<CelestialObject>> {
    let objects = services::get_all(state.repository.as_ref()).await?;
    Ok(Json(objects))
}

/// GET /{id} or GET /{name}
///
/// A segment that parses as an integer id selects a single object; anything
/// else is an exact name lookup returning a list.
pub async fn get_by_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let repo = state.repository.as_ref();
    match key.parse::<CelestialObjectId>() {
        Ok(id) => {
            let object = services::get_by_id(repo, id).await?;
            Ok(Json(object).into_response())
        }
        Err(_) => {
            let objects = services::get_by_name(repo, &key).await?;
            Ok(Json(objects).into_response())
        }
    }
}

// =============================================================================
// Writes
// =============================================================================

/// POST /
///
/// Create an object. Responds 201 with the stored object and a `Location`
/// header pointing at `GET /{id}`.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CelestialObjectPayload>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<CelestialObject>), AppError> {
    let payload = payload_from(body)?;
    let created = services::create(state.repository.as_ref(), &payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, object_location(created.id))],
        Json(created),
    ))
}

/// PUT /{id}
///
/// Full update of name, orbital period and orbited object.
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<CelestialObjectId>, PathRejection>,
    body: Result<Json<CelestialObjectPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_from(id)?;
    let payload = payload_from(body)?;
    services::update(state.repository.as_ref(), id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /{id}/{name}
pub async fn rename_object(
    State(state): State<AppState>,
    path: Result<Path<(CelestialObjectId, String)>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let (id, name) = path_from(path)?;
    services::rename_object(state.repository.as_ref(), id, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /{id}
///
/// Removes the object and its direct satellites; deeper descendants stay.
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<CelestialObjectId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_from(id)?;
    services::delete(state.repository.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for paths outside the API.
pub async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}
