//! `Idempotency-Key` enforcement for mutating endpoints.
//!
//! Mirrors the lock-then-cache-response state machine in
//! `wms_resilience::idempotency`: acquire a lock on an unknown key,
//! replay a cached response verbatim on a repeat with the same
//! fingerprint, and reject a fingerprint change for a reused key.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use wms_resilience::idempotency::{evaluate, fingerprint, IdempotencyOutcome, IdempotencyRecord};

use crate::api::common::ErrorResponse;
use crate::storage::DomainStore;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct IdempotencyState {
    pub store: Arc<dyn DomainStore>,
    pub require_key: bool,
    pub service_name: &'static str,
}

pub async fn idempotency_middleware(
    State(state): State<IdempotencyState>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let key = req
        .headers()
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let Some(key) = key else {
        if state.require_key {
            return ErrorResponse::new(
                "idempotency_key_required",
                "Idempotency-Key header is required for this endpoint",
                path,
            )
            .into_response(StatusCode::BAD_REQUEST);
        }
        return next.run(req).await;
    };

    let (parts, body) = req.into_parts();
    let body_bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return ErrorResponse::new("invalid_body", "Failed to read request body", path)
                .into_response(StatusCode::BAD_REQUEST);
        }
    };

    let fp = fingerprint(state.service_name, &path, &key, &body_bytes);
    let existing = match state.store.get_idempotency_record(&key).await {
        Ok(record) => record,
        Err(_) => None,
    };

    match evaluate(existing.as_ref(), &fp) {
        IdempotencyOutcome::ReplayCached { status, body } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
            (status, body).into_response()
        }
        IdempotencyOutcome::ConflictInProgress => ErrorResponse::new(
            "conflict_in_progress",
            "A request with this idempotency key is already in flight",
            path,
        )
        .into_response(StatusCode::CONFLICT),
        IdempotencyOutcome::FingerprintMismatch => ErrorResponse::new(
            "fingerprint_mismatch",
            "This idempotency key was already used for a different request",
            path,
        )
        .into_response(StatusCode::UNPROCESSABLE_ENTITY),
        IdempotencyOutcome::Proceed => {
            let lock = IdempotencyRecord::new_locked(key.clone(), fp.clone());
            if state.store.put_idempotency_record(lock).await.is_err() {
                return ErrorResponse::new("storage_error", "Failed to acquire idempotency lock", path)
                    .into_response(StatusCode::INTERNAL_SERVER_ERROR);
            }

            let req = Request::from_parts(parts, Body::from(body_bytes));
            let response = next.run(req).await;

            let (resp_parts, resp_body) = response.into_parts();
            let resp_bytes = to_bytes(resp_body, MAX_BODY_BYTES).await.unwrap_or_default();

            let mut record = IdempotencyRecord::new_locked(key, fp);
            record.complete(resp_parts.status.as_u16(), resp_bytes.to_vec());
            let _ = state.store.put_idempotency_record(record).await;

            Response::from_parts(resp_parts, Body::from(resp_bytes))
        }
    }
}
