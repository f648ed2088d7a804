//! Shared event envelope
//!
//! All domain events — regardless of producing aggregate — carry the same
//! versioned envelope. Consumers dedupe by `event_id`; ordering is
//! guaranteed only per aggregate (the outbox preserves commit order per
//! aggregate key, not across aggregates).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tenancy::TenancyContext;

/// Envelope wrapping every event this system produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EventEnvelope {
    /// Unique event ID. Consumers dedupe on this field.
    pub event_id: Uuid,
    /// Envelope schema version, bumped on incompatible payload changes.
    pub version: u32,
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    pub tenancy: TenancyContext,
    /// ID correlating this event back to the request/workflow that caused it.
    pub correlation_id: String,
    /// ID of the specific event/command that directly caused this one.
    pub causation_id: Option<String>,
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    pub fn new(
        event_type: impl Into<String>,
        tenancy: TenancyContext,
        correlation_id: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            version: 1,
            event_type: event_type.into(),
            occurred_at: Utc::now(),
            tenancy,
            correlation_id: correlation_id.into(),
            causation_id: None,
            payload,
        }
    }

    pub fn caused_by(mut self, causation_id: impl Into<String>) -> Self {
        self.causation_id = Some(causation_id.into());
        self
    }
}

/// Broker topics, one per domain aggregate family. Partitioning is by
/// aggregate ID so that events from a single aggregate preserve commit
/// order on the topic.
pub mod topics {
    pub const ORDER: &str = "order";
    pub const WAVE: &str = "wave";
    pub const PICKING: &str = "picking";
    pub const CONSOLIDATION: &str = "consolidation";
    pub const PACKING: &str = "packing";
    pub const SHIPPING: &str = "shipping";
    pub const INVENTORY: &str = "inventory";
    pub const LABOR: &str = "labor";
    pub const FACILITY: &str = "facility";
    pub const STOW: &str = "stow";
    pub const SORTATION: &str = "sortation";
    pub const RECEIVING: &str = "receiving";
    pub const UNIT: &str = "unit";
    pub const BILLING: &str = "billing";
    pub const PROCESS_PATH: &str = "process-path";
    pub const CHANNEL: &str = "channel";
    pub const SELLER: &str = "seller";
}

/// Event type names emitted by the fulfillment core.
pub mod event_types {
    pub const ORDER_RECEIVED: &str = "OrderReceived";
    pub const ORDER_WAVE_ASSIGNED: &str = "OrderWaveAssigned";
    pub const ORDER_CANCELLED: &str = "OrderCancelled";
    pub const ORDER_SHIPPED: &str = "OrderShipped";
    pub const ORDER_DEAD_LETTERED: &str = "OrderDeadLettered";
    pub const PROCESS_PATH_ESCALATED: &str = "ProcessPathEscalated";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_defaults() {
        let tenancy = TenancyContext::new("t1", "f1", "w1");
        let env = EventEnvelope::new(
            event_types::ORDER_RECEIVED,
            tenancy,
            "corr-1",
            serde_json::json!({"orderId": "ORD-001"}),
        );
        assert_eq!(env.version, 1);
        assert_eq!(env.event_type, "OrderReceived");
        assert!(env.causation_id.is_none());
    }

    #[test]
    fn test_caused_by() {
        let tenancy = TenancyContext::new("t1", "f1", "w1");
        let env = EventEnvelope::new(
            event_types::ORDER_CANCELLED,
            tenancy,
            "corr-1",
            serde_json::json!({}),
        )
        .caused_by("evt-parent");
        assert_eq!(env.causation_id.as_deref(), Some("evt-parent"));
    }
}
