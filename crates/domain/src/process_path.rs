//! Process-path escalation
//!
//! The routing engine assigns each order a process path tier based on
//! station availability and scoring. When the optimal tier cannot be
//! honored the order escalates through progressively less specialized
//! stations rather than stalling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Escalation tier, ordered from most to least specialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EscalationTier {
    Optimal,
    Standard,
    Degraded,
    Manual,
}

impl EscalationTier {
    /// The next tier down in the escalation ladder, or `None` if already
    /// at `Manual` (the terminal fallback, always staffed).
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Optimal => Some(Self::Standard),
            Self::Standard => Some(Self::Degraded),
            Self::Degraded => Some(Self::Manual),
            Self::Manual => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TierChange {
    pub from: EscalationTier,
    pub to: EscalationTier,
    pub reason: String,
    pub changed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProcessPath {
    pub order_id: String,
    #[sqlx(json)]
    pub current_tier: EscalationTier,
    #[sqlx(json)]
    pub history: Vec<TierChange>,
    #[sqlx(json)]
    pub fallback_station_ids: Vec<String>,
}

impl ProcessPath {
    pub fn new(order_id: impl Into<String>, fallback_station_ids: Vec<String>) -> Self {
        Self {
            order_id: order_id.into(),
            current_tier: EscalationTier::Optimal,
            history: Vec::new(),
            fallback_station_ids,
        }
    }

    /// Escalate to the next tier down, recording the reason. Returns
    /// `false` without mutating state if already at `Manual`.
    pub fn escalate(&mut self, reason: impl Into<String>) -> bool {
        let Some(next) = self.current_tier.next() else {
            return false;
        };
        self.history.push(TierChange {
            from: self.current_tier,
            to: next,
            reason: reason.into(),
            changed_at: Utc::now(),
        });
        self.current_tier = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalate_advances_tier_and_records_history() {
        let mut path = ProcessPath::new("ORD-1", vec!["STATION-5".into()]);
        assert!(path.escalate("no optimal station available"));
        assert_eq!(path.current_tier, EscalationTier::Standard);
        assert_eq!(path.history.len(), 1);
    }

    #[test]
    fn test_escalate_stops_at_manual() {
        let mut path = ProcessPath::new("ORD-1", vec![]);
        path.escalate("r1");
        path.escalate("r2");
        path.escalate("r3");
        assert_eq!(path.current_tier, EscalationTier::Manual);
        assert!(!path.escalate("r4"));
    }
}
