//! `POST /api/v1/signals/{signalName}` — one endpoint per signal the
//! orchestrator accepts from WES/WMS/carrier integrations.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{with_propagation_headers, CorrelationId, ErrorResponse, PropagatedContext};
use crate::services::{SignalBridgeError, SignalBridgeService, SignalOutcome};

#[derive(Clone)]
pub struct AppState {
    pub signals: Arc<SignalBridgeService>,
}

impl AppState {
    pub fn new(signals: Arc<SignalBridgeService>) -> Self {
        Self { signals }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignalRequest {
    /// The correlating entity ID — usually the order ID, occasionally a
    /// shipment ID under the `wes-{orderId}` convention.
    pub order_id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignalResponse {
    pub workflow_id: Option<uuid::Uuid>,
    pub acknowledged: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/signals/{signalName}",
    params(("signalName" = String, Path, description = "wave-assigned | pick-completed | tote-arrived | consolidation-completed | gift-wrap-completed | walling-completed | packing-completed | receiving-completed | stow-completed")),
    request_body = SignalRequest,
    responses(
        (status = 200, description = "Signal delivered or acknowledged", body = SignalResponse),
        (status = 404, description = "Unknown signal name", body = ErrorResponse),
        (status = 500, description = "Workflow not found for an order-scoped signal", body = ErrorResponse),
    ),
    tag = "signals",
)]
pub async fn send_signal(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    propagated: PropagatedContext,
    Path(signal_name): Path<String>,
    Json(req): Json<SignalRequest>,
) -> Response {
    let path = format!("/api/v1/signals/{signal_name}");
    tracing::debug!(
        signal = %signal_name,
        order_id = %req.order_id,
        wave_number = ?propagated.wave_number,
        inbound_workflow_id = ?propagated.workflow_id,
        "dispatching external signal"
    );

    match state.signals.dispatch(&signal_name, &req.order_id, req.payload).await {
        Ok(SignalOutcome::Delivered { workflow_id }) => {
            let response = Json(SignalResponse {
                workflow_id: Some(workflow_id),
                acknowledged: true,
            })
            .into_response();
            with_propagation_headers(response, &correlation_id, Some(workflow_id))
        }
        Ok(SignalOutcome::AckOnly) => Json(SignalResponse {
            workflow_id: None,
            acknowledged: true,
        })
        .into_response(),
        Err(SignalBridgeError::UnknownSignal(name)) => {
            ErrorResponse::new("unknown_signal", format!("no such signal: {name}"), path)
                .into_response(StatusCode::NOT_FOUND)
        }
        Err(SignalBridgeError::WorkflowNotFound(order_id)) => ErrorResponse::new(
            "workflow_not_found",
            format!("no running workflow for order {order_id}"),
            path,
        )
        .into_response(StatusCode::INTERNAL_SERVER_ERROR),
        Err(e) => ErrorResponse::new("signal_dispatch_error", e.to_string(), path)
            .into_response(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/signals/{signalName}", post(send_signal))
        .with_state(state)
}
