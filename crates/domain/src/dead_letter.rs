//! Dead-letter entries
//!
//! An order that exhausts its reprocessing attempts (see [`crate::retry`])
//! is promoted into the dead-letter queue with a full snapshot and retry
//! history for manual triage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::retry::RetryMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterResolution {
    Unresolved,
    ManualRetry,
    Cancelled,
    Escalated,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeadLetterEntry {
    pub entry_id: String,
    pub order_id: String,
    #[sqlx(json)]
    pub order_snapshot: Order,
    #[sqlx(json)]
    pub retry_history: RetryMetadata,
    #[sqlx(json)]
    pub resolution: DeadLetterResolution,
    pub notes: Option<String>,
    pub resolved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl DeadLetterEntry {
    pub fn new(entry_id: impl Into<String>, order_snapshot: Order, retry_history: RetryMetadata) -> Self {
        Self {
            entry_id: entry_id.into(),
            order_id: order_snapshot.order_id.clone(),
            order_snapshot,
            retry_history,
            resolution: DeadLetterResolution::Unresolved,
            notes: None,
            resolved_by: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn resolve(&mut self, resolution: DeadLetterResolution, resolved_by: impl Into<String>, notes: Option<String>) {
        self.resolution = resolution;
        self.resolved_by = Some(resolved_by.into());
        self.notes = notes;
        self.resolved_at = Some(Utc::now());
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution != DeadLetterResolution::Unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{LineItem, OrderPriority, ShipAddress};
    use crate::tenancy::TenancyContext;

    fn sample_order() -> Order {
        Order::new(
            "ORD-001",
            "CUST-1",
            vec![LineItem { sku: "SKU-1".into(), quantity: 1, weight_grams: 100 }],
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
    fn test_resolve_sets_resolution_and_timestamp() {
        let mut entry = DeadLetterEntry::new("DLQ-1", sample_order(), RetryMetadata::new("ORD-001"));
        assert!(!entry.is_resolved());
        entry.resolve(DeadLetterResolution::ManualRetry, "ops-user", Some("retrying after carrier outage".into()));
        assert!(entry.is_resolved());
        assert!(entry.resolved_at.is_some());
    }
}
