//! Shared DTOs and extractors for the HTTP surface.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use wms_domain::tenancy::TenancyContext;

/// Standard error body for every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub request_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub path: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            request_id: Uuid::now_v7(),
            timestamp: Utc::now(),
            path: path.into(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn into_response(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Response wrapper for list endpoints — all list endpoints return
/// responses wrapped in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Tenancy headers, extracted on every request. `X-WMS-Tenant-ID`,
/// `X-WMS-Facility-ID` and `X-WMS-Warehouse-ID` default to `"default"`
/// at the service boundary when absent — workflows themselves never see
/// a missing tenancy context, since it's fixed as part of their input
/// once a workflow starts.
pub struct Tenancy(pub TenancyContext);

impl<S> FromRequestParts<S> for Tenancy
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let tenant_id = header("x-wms-tenant-id").unwrap_or_else(|| "default".to_string());
        let facility_id = header("x-wms-facility-id").unwrap_or_else(|| "default".to_string());
        let warehouse_id = header("x-wms-warehouse-id").unwrap_or_else(|| "default".to_string());
        let mut ctx = TenancyContext::new(tenant_id, facility_id, warehouse_id);
        ctx.seller_id = header("x-wms-seller-id");
        ctx.channel_id = header("x-wms-channel-id");

        Ok(Tenancy(ctx))
    }
}

/// `X-WMS-Correlation-ID`, generated if the caller didn't supply one.
pub struct CorrelationId(pub String);

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-wms-correlation-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        Ok(CorrelationId(id))
    }
}

/// `X-WMS-Wave-Number` and `X-WMS-Workflow-ID`, the other two CloudEvents
/// extensions this surface propagates end to end — present on requests
/// that originate from a signal or event already carrying them (e.g. a
/// downstream service relaying a wave-scoped callback), absent on a
/// fresh order-intake request.
pub struct PropagatedContext {
    pub wave_number: Option<String>,
    pub workflow_id: Option<Uuid>,
}

impl<S> FromRequestParts<S> for PropagatedContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let wave_number = parts
            .headers
            .get("x-wms-wave-number")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let workflow_id = parts
            .headers
            .get("x-wms-workflow-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok());
        Ok(PropagatedContext { wave_number, workflow_id })
    }
}

/// Attaches `X-WMS-Correlation-ID` and, when known, `X-WMS-Workflow-ID`
/// to an outgoing response — the mirror of [`CorrelationId`] and
/// [`PropagatedContext`] on the request side.
pub fn with_propagation_headers(mut response: Response, correlation_id: &str, workflow_id: Option<Uuid>) -> Response {
    let headers = response.headers_mut();
    if let Ok(value) = correlation_id.parse() {
        headers.insert("x-wms-correlation-id", value);
    }
    if let Some(id) = workflow_id {
        if let Ok(value) = id.to_string().parse() {
            headers.insert("x-wms-workflow-id", value);
        }
    }
    response
}
