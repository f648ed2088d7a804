//! Consolidation aggregate
//!
//! Multi-item orders picked across several totes are consolidated into a
//! single destination bin before packing. Consolidation is the
//! reconciliation between what was expected (from the order's line
//! items) and what actually arrived at the bin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExpectedItem {
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConsolidatedItem {
    pub sku: String,
    pub quantity: u32,
    pub source_tote_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationStatus {
    AwaitingTotes,
    Complete,
    Shortage,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConsolidationUnit {
    pub unit_id: String,
    pub order_id: String,
    pub destination_bin_id: String,
    #[sqlx(json)]
    pub expected_items: Vec<ExpectedItem>,
    #[sqlx(json)]
    pub consolidated_items: Vec<ConsolidatedItem>,
    #[sqlx(json)]
    pub status: ConsolidationStatus,
    pub created_at: DateTime<Utc>,
}

impl ConsolidationUnit {
    pub fn new(unit_id: impl Into<String>, order_id: impl Into<String>, destination_bin_id: impl Into<String>, expected_items: Vec<ExpectedItem>) -> Self {
        Self {
            unit_id: unit_id.into(),
            order_id: order_id.into(),
            destination_bin_id: destination_bin_id.into(),
            expected_items,
            consolidated_items: Vec::new(),
            status: ConsolidationStatus::AwaitingTotes,
            created_at: Utc::now(),
        }
    }

    pub fn record_tote_arrival(&mut self, sku: impl Into<String>, quantity: u32, source_tote_id: impl Into<String>) {
        self.consolidated_items.push(ConsolidatedItem {
            sku: sku.into(),
            quantity,
            source_tote_id: source_tote_id.into(),
        });
        self.recompute_status();
    }

    fn recompute_status(&mut self) {
        let complete = self.expected_items.iter().all(|expected| {
            let have: u32 = self
                .consolidated_items
                .iter()
                .filter(|item| item.sku == expected.sku)
                .map(|item| item.quantity)
                .sum();
            have >= expected.quantity
        });
        self.status = if complete {
            ConsolidationStatus::Complete
        } else {
            ConsolidationStatus::AwaitingTotes
        };
    }

    /// Mark the unit as short after all expected totes have arrived but
    /// quantities don't reconcile — the escalation path for a physical
    /// inventory discrepancy.
    pub fn mark_shortage(&mut self) {
        self.status = ConsolidationStatus::Shortage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recompute_status_transitions_to_complete() {
        let mut unit = ConsolidationUnit::new(
            "CU-1",
            "ORD-1",
            "BIN-1",
            vec![ExpectedItem { sku: "SKU-1".into(), quantity: 3 }],
        );
        unit.record_tote_arrival("SKU-1", 2, "TOTE-1");
        assert_eq!(unit.status, ConsolidationStatus::AwaitingTotes);
        unit.record_tote_arrival("SKU-1", 1, "TOTE-2");
        assert_eq!(unit.status, ConsolidationStatus::Complete);
    }

    #[test]
    fn test_mark_shortage() {
        let mut unit = ConsolidationUnit::new("CU-1", "ORD-1", "BIN-1", vec![]);
        unit.mark_shortage();
        assert_eq!(unit.status, ConsolidationStatus::Shortage);
    }
}
