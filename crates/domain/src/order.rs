//! Order aggregate
//!
//! The order is the aggregate root of the fulfillment domain. State
//! transitions are monotonic along the happy path
//! (`received → validated → wave_assigned → routed → picking →
//! consolidated → packed → shipped → completed`); cancellation is
//! reachable from any non-terminal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::retry::RetryMetadata;
use crate::tenancy::TenancyContext;

/// Shipping priority. Drives the signal-await timeouts used by the
/// fulfillment workflow (same_day: 15m, next_day: 1h, standard: 4h,
/// economy: 12h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
    SameDay,
    NextDay,
    Standard,
    Economy,
}

impl OrderPriority {
    /// Wave-assignment signal timeout for this priority.
    pub fn wave_assignment_timeout(self) -> std::time::Duration {
        match self {
            Self::SameDay => std::time::Duration::from_secs(15 * 60),
            Self::NextDay => std::time::Duration::from_secs(60 * 60),
            Self::Standard => std::time::Duration::from_secs(4 * 60 * 60),
            Self::Economy => std::time::Duration::from_secs(12 * 60 * 60),
        }
    }

    /// Pick-completion signal timeout, scaled the same way as the
    /// wave-assignment timeout.
    pub fn pick_completion_timeout(self) -> std::time::Duration {
        self.wave_assignment_timeout()
    }
}

/// Order status. Transitions are monotonic along the happy path;
/// `cancelled` and `dead_letter` are reachable from any non-terminal
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Validated,
    WaveAssigned,
    Routed,
    Picking,
    Consolidated,
    Packed,
    Shipped,
    Completed,
    Failed,
    Compensating,
    Cancelled,
    DeadLetter,
}

impl OrderStatus {
    /// Whether this status has no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::DeadLetter)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LineItem {
    pub sku: String,
    pub quantity: u32,
    /// Weight in grams.
    pub weight_grams: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ShipAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

/// Order aggregate root, keyed by `order_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    #[sqlx(json)]
    pub line_items: Vec<LineItem>,
    #[sqlx(json)]
    pub ship_address: ShipAddress,
    #[sqlx(json)]
    pub priority: OrderPriority,
    pub promised_delivery_at: DateTime<Utc>,
    #[sqlx(json)]
    pub status: OrderStatus,
    pub wave_id: Option<String>,
    pub tracking_number: Option<String>,

    pub tenant_id: String,
    pub facility_id: String,
    pub warehouse_id: String,
    pub seller_id: Option<String>,
    pub channel_id: Option<String>,

    /// Workflow ID of the fulfillment orchestration driving this order.
    pub workflow_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        line_items: Vec<LineItem>,
        ship_address: ShipAddress,
        priority: OrderPriority,
        promised_delivery_at: DateTime<Utc>,
        tenancy: TenancyContext,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            line_items,
            ship_address,
            priority,
            promised_delivery_at,
            status: OrderStatus::Received,
            wave_id: None,
            tracking_number: None,
            tenant_id: tenancy.tenant_id,
            facility_id: tenancy.facility_id,
            warehouse_id: tenancy.warehouse_id,
            seller_id: tenancy.seller_id,
            channel_id: tenancy.channel_id,
            workflow_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Workflow ID convention: `order-fulfillment-{orderId}`.
    pub fn fulfillment_workflow_id(&self) -> String {
        format!("order-fulfillment-{}", self.order_id)
    }

    pub fn is_multi_item(&self) -> bool {
        self.line_items.len() > 1 || self.line_items.iter().any(|i| i.quantity > 1)
    }

    /// Invariant: no order reaches `shipped` without a tracking number.
    pub fn mark_shipped(&mut self, tracking_number: impl Into<String>) {
        self.tracking_number = Some(tracking_number.into());
        self.status = OrderStatus::Shipped;
        self.updated_at = Utc::now();
    }
}

/// RetryMetadata paired with the order it belongs to — a convenience for
/// reprocessing queries that need both.
#[derive(Debug, Clone)]
pub struct OrderWithRetry {
    pub order: Order,
    pub retry: Option<RetryMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> Order {
        Order::new(
            "ORD-001",
            "CUST-1",
            vec![LineItem {
                sku: "SKU-1".into(),
                quantity: 2,
                weight_grams: 500,
            }],
            ShipAddress {
                line1: "1 Main St".into(),
                line2: None,
                city: "Springfield".into(),
                region: "IL".into(),
                postal_code: "62701".into(),
                country: "US".into(),
            },
            OrderPriority::Standard,
            Utc::now(),
            TenancyContext::new("t1", "f1", "w1"),
        )
    }

    #[test]
    fn test_fulfillment_workflow_id() {
        let order = sample_order();
        assert_eq!(order.fulfillment_workflow_id(), "order-fulfillment-ORD-001");
    }

    #[test]
    fn test_is_multi_item() {
        assert!(sample_order().is_multi_item());
    }

    #[test]
    fn test_mark_shipped_sets_tracking_and_status() {
        let mut order = sample_order();
        order.mark_shipped("1Z999AA10123456784");
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_number.as_deref(), Some("1Z999AA10123456784"));
    }

    #[test]
    fn test_priority_timeouts() {
        assert_eq!(
            OrderPriority::SameDay.wave_assignment_timeout(),
            std::time::Duration::from_secs(900)
        );
        assert_eq!(
            OrderPriority::Economy.wave_assignment_timeout(),
            std::time::Duration::from_secs(12 * 3600)
        );
    }

    #[test]
    fn test_terminal_status() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::DeadLetter.is_terminal());
        assert!(!OrderStatus::Picking.is_terminal());
    }
}
