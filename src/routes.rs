//! The `/api/v1` router plus unversioned common routes.
//!
//! `metadata` and `permissions` are literal segments, so they win over the
//! `/:resource` capture; any other segment is treated as a table name.

use crate::handlers::{entity, meta};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/metadata", get(meta::metadata))
        .route("/permissions", get(meta::permissions))
        .route(
            "/:resource",
            get(entity::list)
                .post(entity::create)
                .put(entity::update_collection)
                .delete(entity::delete_collection)
                .options(entity::preflight),
        )
        .route(
            "/:resource/:id",
            get(entity::read)
                .post(entity::create_record)
                .put(entity::update)
                .delete(entity::delete)
                .options(entity::preflight),
        )
        .with_state(state)
}

/// Common routes (no API prefix): GET /health, GET /version.
pub fn common_routes() -> Router {
    Router::new()
        .route("/health", get(meta::health))
        .route("/version", get(meta::version))
}
