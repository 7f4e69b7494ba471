//! Route handlers and error mapping.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use super::sample::sample_schema;
use super::server::AppState;
use crate::config::DbKind;
use crate::discovery::{DiscoveryError, DiscoveryRequest, DiscoveryResponse};
use crate::store::{ConnectionProfile, NewProfile, StoreError};

/// An error response: `{"status":"error","error":<code>,"detail":<message>}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub detail: String,
}

impl ApiError {
    fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            detail: detail.into(),
        }
    }
}

impl From<DiscoveryError> for ApiError {
    fn from(err: DiscoveryError) -> Self {
        let status = match &err {
            DiscoveryError::ConnectionFormat(_)
            | DiscoveryError::MissingDatabaseName(_)
            | DiscoveryError::MissingConnectionString(_)
            | DiscoveryError::KindMismatch { .. } => StatusCode::BAD_REQUEST,
            DiscoveryError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            DiscoveryError::Connection(_) => StatusCode::BAD_GATEWAY,
            DiscoveryError::CatalogRead { .. }
            | DiscoveryError::DuplicateNode(_)
            | DiscoveryError::InvalidEdge { .. }
            | DiscoveryError::ProfileStore(_)
            | DiscoveryError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            code: err.code(),
            detail: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "profile_store",
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(code = self.code, detail = %self.detail, "request failed");
        }
        let body = json!({
            "status": "error",
            "error": self.code,
            "detail": self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/schema/sample
pub async fn get_sample() -> Result<Json<Value>, ApiError> {
    let schema = sample_schema().map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "schema": schema })))
}

/// POST /api/schema/mysql
pub async fn discover_mysql(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiscoveryRequest>,
) -> Result<Json<DiscoveryResponse>, ApiError> {
    Ok(Json(state.service.run(DbKind::Relational, &req).await?))
}

/// POST /api/schema/mongo
pub async fn discover_mongo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiscoveryRequest>,
) -> Result<Json<DiscoveryResponse>, ApiError> {
    Ok(Json(state.service.run(DbKind::Document, &req).await?))
}

/// GET /api/connections - Saved profiles, newest first.
pub async fn list_connections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ConnectionProfile>>, ApiError> {
    Ok(Json(state.profiles.list()?))
}

/// POST /api/connections
pub async fn create_connection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewProfile>,
) -> Result<(StatusCode, Json<ConnectionProfile>), ApiError> {
    let profile = state.profiles.create(req)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// DELETE /api/connections/{id}
pub async fn delete_connection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.profiles.delete(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("connection profile {} not found", id)))
    }
}
