//! Meta endpoints: cached schema metadata, cached privilege rows, health,
//! and version.

use crate::error::ApiError;
use crate::service::{metadata_projection, permissions_projection};
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

pub async fn metadata(State(state): State<AppState>) -> Json<Value> {
    let cached = state
        .metadata
        .get_or_init(|| async { metadata_projection(&state.catalog) })
        .await;
    Json(cached.clone())
}

pub async fn permissions(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let cached = state
        .permissions
        .get_or_try_init(|| async {
            permissions_projection(&state.pool, &state.catalog.schema).await
        })
        .await?;
    Ok(Json(cached.clone()))
}

#[derive(Serialize)]
pub struct HealthBody {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

pub async fn version() -> Json<Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
