//! Operator-facing dead-letter queue endpoints: list and resolve.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use wms_domain::dead_letter::{DeadLetterEntry, DeadLetterResolution};

use crate::api::common::{ErrorResponse, ListResponse};
use crate::services::{DeadLetterService, DeadLetterServiceError};

#[derive(Clone)]
pub struct AppState {
    pub dead_letters: Arc<DeadLetterService>,
}

impl AppState {
    pub fn new(dead_letters: Arc<DeadLetterService>) -> Self {
        Self { dead_letters }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListDeadLettersQuery {
    pub resolution: Option<DeadLetterResolution>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveDeadLetterRequest {
    pub resolution: DeadLetterResolution,
    pub resolved_by: String,
    pub notes: Option<String>,
}

impl IntoResponse for DeadLetterServiceError {
    fn into_response(self) -> Response {
        let path = "/api/v1/dead-letters".to_string();
        match self {
            DeadLetterServiceError::NotFound(id) => {
                ErrorResponse::new("dead_letter_not_found", format!("no entry {id}"), path)
                    .into_response(StatusCode::NOT_FOUND)
            }
            DeadLetterServiceError::Resolution(e) => {
                ErrorResponse::new("already_resolved", e.to_string(), path).into_response(StatusCode::CONFLICT)
            }
            other => ErrorResponse::new("dead_letter_error", other.to_string(), path)
                .into_response(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/dead-letters",
    params(("resolution" = Option<DeadLetterResolution>, Query)),
    responses((status = 200, description = "Dead-letter entries", body = ListResponse<DeadLetterEntry>)),
    tag = "dead-letters",
)]
pub async fn list_dead_letters(
    State(state): State<AppState>,
    Query(query): Query<ListDeadLettersQuery>,
) -> Result<Json<ListResponse<DeadLetterEntry>>, DeadLetterServiceError> {
    let entries = state.dead_letters.list(query.resolution).await?;
    Ok(Json(entries.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/dead-letters/{entryId}",
    params(("entryId" = String, Path)),
    responses(
        (status = 200, description = "Dead-letter entry", body = DeadLetterEntry),
        (status = 404, description = "Not found", body = ErrorResponse),
    ),
    tag = "dead-letters",
)]
pub async fn get_dead_letter(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<Json<DeadLetterEntry>, DeadLetterServiceError> {
    Ok(Json(state.dead_letters.get(&entry_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/dead-letters/{entryId}/resolve",
    params(("entryId" = String, Path)),
    request_body = ResolveDeadLetterRequest,
    responses(
        (status = 200, description = "Resolved", body = DeadLetterEntry),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Already resolved", body = ErrorResponse),
    ),
    tag = "dead-letters",
)]
pub async fn resolve_dead_letter(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(req): Json<ResolveDeadLetterRequest>,
) -> Result<Json<DeadLetterEntry>, DeadLetterServiceError> {
    let entry = state
        .dead_letters
        .resolve(&entry_id, req.resolution, req.resolved_by, req.notes)
        .await?;
    Ok(Json(entry))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/dead-letters", get(list_dead_letters))
        .route("/api/v1/dead-letters/{entryId}", get(get_dead_letter))
        .route("/api/v1/dead-letters/{entryId}/resolve", post(resolve_dead_letter))
        .with_state(state)
}
