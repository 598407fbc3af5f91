//! Route handlers, generic over the store and the resource.
//!
//! Each handler runs one linear sequence per request: parse the id, check
//! the body, call the store, shape the response. Nothing survives the
//! request except what the store keeps.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use super::error::ApiError;
use super::AppState;
use crate::error::Error;
use crate::record::{Person, Record, RecordId, Resource};
use crate::store::RecordStore;

/// Conflict on the unique field of `T`.
fn conflict<T: Resource>() -> ApiError {
    ApiError::Conflict {
        field: T::UNIQUE_FIELD.unwrap_or("key"),
    }
}

/// Map a store error, reporting a lost uniqueness race as a conflict.
fn store_error<T: Resource>(err: Error) -> ApiError {
    if err.is_duplicate() {
        conflict::<T>()
    } else {
        err.into()
    }
}

/// `GET /api/{collection}`
///
/// # Errors
///
/// Fails only on store faults.
pub async fn list<S: RecordStore, T: Resource>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Record<T>>>, ApiError> {
    let records = state.store.find_all::<T>().await?;
    Ok(Json(records))
}

/// `GET /api/{collection}/:id`
///
/// # Errors
///
/// 400 for a malformed id, 404 when nothing matches.
pub async fn show<S: RecordStore, T: Resource>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Record<T>>, ApiError> {
    let id = RecordId::parse(&id)?;
    state
        .store
        .find_by_id::<T>(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// `POST /api/{collection}`
///
/// # Errors
///
/// 400 for an unreadable body, a missing field or a taken unique key.
pub async fn create<S: RecordStore, T: Resource>(
    State(state): State<AppState<S>>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<(StatusCode, Json<Record<T>>), ApiError> {
    let Json(fields) = payload?;
    fields.validate()?;

    if let Some(key) = fields.unique_key() {
        if state.store.find_by_unique_key::<T>(key).await?.is_some() {
            debug!("Rejected duplicate {} {:?}", T::COLLECTION, key);
            return Err(conflict::<T>());
        }
    }

    let record = state
        .store
        .insert(fields)
        .await
        .map_err(store_error::<T>)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /api/{collection}/:id`
///
/// Replaces every mutable field; the id stays.
///
/// # Errors
///
/// 400 for a malformed id, an unreadable body, a missing field or a taken
/// unique key; 404 when nothing matches.
pub async fn update<S: RecordStore, T: Resource>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<Json<Record<T>>, ApiError> {
    let id = RecordId::parse(&id)?;
    let Json(fields) = payload?;
    fields.validate()?;

    state
        .store
        .replace(id, fields)
        .await
        .map_err(store_error::<T>)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// `DELETE /api/{collection}/:id`
///
/// Answers 204 whether or not a record was removed.
///
/// # Errors
///
/// 400 for a malformed id.
pub async fn remove<S: RecordStore, T: Resource>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = RecordId::parse(&id)?;
    let removed = state.store.delete_by_id::<T>(id).await?;
    if !removed {
        debug!("Delete of absent {} record {}", T::COLLECTION, id);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /info`: phonebook size and the server time.
///
/// # Errors
///
/// Fails only on store faults.
pub async fn info<S: RecordStore>(
    State(state): State<AppState<S>>,
) -> Result<Html<String>, ApiError> {
    let count = state.store.count::<Person>().await?;
    Ok(Html(format!(
        "<p>Phonebook has info for {count} people</p><p>{}</p>",
        Utc::now().to_rfc2822()
    )))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Fallback for every unmatched route.
pub async fn unknown_endpoint() -> ApiError {
    ApiError::UnknownEndpoint
}
