//! `POST /api/v1/orders`, `GET /api/v1/orders/{orderId}`, `GET /api/v1/orders`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use wms_domain::order::{LineItem, Order, OrderPriority, OrderStatus, ShipAddress};

use crate::api::common::{with_propagation_headers, CorrelationId, ErrorResponse, ListResponse, Tenancy};
use crate::services::{OrderIntakeError, OrderIntakeService};

#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderIntakeService>,
}

impl AppState {
    pub fn new(orders: Arc<OrderIntakeService>) -> Self {
        Self { orders }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub order_id: String,
    pub customer_id: String,
    pub line_items: Vec<LineItem>,
    pub ship_address: ShipAddress,
    pub priority: OrderPriority,
    pub promised_delivery_at: DateTime<Utc>,
    #[serde(default)]
    pub requires_gift_wrap: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub workflow_id: Option<uuid::Uuid>,
    pub status: OrderStatus,
}

impl From<Order> for CreateOrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id,
            workflow_id: order.workflow_id,
            status: order.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

impl IntoResponse for OrderIntakeError {
    fn into_response(self) -> Response {
        match self {
            OrderIntakeError::Storage(e) => {
                ErrorResponse::new("storage_error", e.to_string(), "/api/v1/orders")
                    .into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
            OrderIntakeError::Workflow(e) => {
                ErrorResponse::new("workflow_error", e.to_string(), "/api/v1/orders")
                    .into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order accepted and fulfillment workflow started", body = CreateOrderResponse),
        (status = 500, description = "Storage or workflow error", body = ErrorResponse),
    ),
    tag = "orders",
)]
pub async fn create_order(
    State(state): State<AppState>,
    Tenancy(tenancy): Tenancy,
    CorrelationId(correlation_id): CorrelationId,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Response, OrderIntakeError> {
    let order = state
        .orders
        .create_order(
            req.order_id,
            req.customer_id,
            req.line_items,
            req.ship_address,
            req.priority,
            req.promised_delivery_at,
            req.requires_gift_wrap,
            tenancy,
        )
        .await?;

    let workflow_id = order.workflow_id;
    let response = (StatusCode::CREATED, Json(CreateOrderResponse::from(order))).into_response();
    Ok(with_propagation_headers(response, &correlation_id, workflow_id))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{orderId}",
    params(("orderId" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Order not found", body = ErrorResponse),
    ),
    tag = "orders",
)]
pub async fn get_order(
    State(state): State<AppState>,
    CorrelationId(correlation_id): CorrelationId,
    Path(order_id): Path<String>,
) -> Result<Response, OrderIntakeError> {
    match state.orders.get_order(&order_id).await? {
        Some(order) => {
            let workflow_id = order.workflow_id;
            let response = Json(order).into_response();
            Ok(with_propagation_headers(response, &correlation_id, workflow_id))
        }
        None => Ok(ErrorResponse::new(
            "order_not_found",
            format!("no order with ID {order_id}"),
            format!("/api/v1/orders/{order_id}"),
        )
        .into_response(StatusCode::NOT_FOUND)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(("status" = Option<OrderStatus>, Query), ("limit" = Option<i64>, Query)),
    responses((status = 200, description = "Orders matching the filter", body = ListResponse<Order>)),
    tag = "orders",
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ListResponse<Order>>, OrderIntakeError> {
    let status = query.status.unwrap_or(OrderStatus::Received);
    let orders = state.orders.list_orders_by_status(status, query.limit).await?;
    Ok(Json(orders.into()))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/orders", post(create_order).get(list_orders))
        .route("/api/v1/orders/{orderId}", get(get_order))
        .with_state(state)
}
