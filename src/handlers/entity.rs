//! Generic resource handlers: one set for `/:resource`, one for
//! `/:resource/:id`. Every handler funnels into `CrudExecutor::handle`, so
//! the method x id-presence semantics (including the structural rejections)
//! live in one place.

use crate::error::ApiError;
use crate::response::rows_body;
use crate::service::CrudExecutor;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

/// An absent body stays absent; present bytes must be valid JSON.
fn parse_body(bytes: &Bytes) -> Result<Option<Value>, ApiError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| ApiError::MalformedQuery(format!("invalid JSON body: {}", e)))
}

async fn dispatch(
    state: &AppState,
    method: Method,
    resource: &str,
    id: Option<&str>,
    params: &HashMap<String, String>,
    body: Option<&Value>,
) -> Result<Json<Value>, ApiError> {
    let rows = CrudExecutor::handle(&state.pool, &state.catalog, &method, resource, id, params, body).await?;
    Ok(Json(rows_body(rows)))
}

pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    dispatch(&state, Method::GET, &resource, None, &params, None).await
}

pub async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;
    dispatch(&state, Method::POST, &resource, None, &HashMap::new(), body.as_ref()).await
}

/// PUT on the collection is structurally disallowed; routed through the
/// executor so resource existence is still checked first.
pub async fn update_collection(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<Value>, ApiError> {
    dispatch(&state, Method::PUT, &resource, None, &HashMap::new(), None).await
}

/// DELETE on the collection is structurally disallowed.
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<Value>, ApiError> {
    dispatch(&state, Method::DELETE, &resource, None, &HashMap::new(), None).await
}

pub async fn read(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    dispatch(&state, Method::GET, &resource, Some(&id), &HashMap::new(), None).await
}

/// POST to an identifier path is structurally disallowed; creation targets
/// the collection.
pub async fn create_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    dispatch(&state, Method::POST, &resource, Some(&id), &HashMap::new(), None).await
}

pub async fn update(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)?;
    dispatch(&state, Method::PUT, &resource, Some(&id), &HashMap::new(), body.as_ref()).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    dispatch(&state, Method::DELETE, &resource, Some(&id), &HashMap::new(), None).await
}

/// OPTIONS accepted on both route shapes; no body semantics.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
