//! Retry metadata
//!
//! Tracked per order, independent of the orchestrator's own per-activity
//! retry policy: this is the domain-level record of how many times an
//! order has been pushed back through reprocessing after landing in a
//! failed or dead-letter state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default ceiling on reprocessing attempts before an order is eligible
/// for dead-letter promotion.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RetryMetadata {
    pub order_id: String,
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub last_failure_code: Option<String>,
    pub last_failure_reason: Option<String>,
    pub last_workflow_id: Option<Uuid>,
    pub last_run_id: Option<Uuid>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl RetryMetadata {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            attempt_count: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            last_failure_code: None,
            last_failure_reason: None,
            last_workflow_id: None,
            last_run_id: None,
            last_failure_at: None,
        }
    }

    pub fn record_failure(
        &mut self,
        failure_code: impl Into<String>,
        reason: impl Into<String>,
        workflow_id: Uuid,
        run_id: Uuid,
    ) {
        self.attempt_count += 1;
        self.last_failure_code = Some(failure_code.into());
        self.last_failure_reason = Some(reason.into());
        self.last_workflow_id = Some(workflow_id);
        self.last_run_id = Some(run_id);
        self.last_failure_at = Some(Utc::now());
    }

    /// Whether reprocessing has been exhausted and the order should be
    /// promoted to the dead-letter queue instead of retried again.
    pub fn is_exhausted(&self) -> bool {
        self.attempt_count >= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_failure_increments_attempt_count() {
        let mut meta = RetryMetadata::new("ORD-001");
        meta.record_failure("PICK_TIMEOUT", "no picker assigned", Uuid::now_v7(), Uuid::now_v7());
        assert_eq!(meta.attempt_count, 1);
        assert!(meta.last_failure_reason.is_some());
    }

    #[test]
    fn test_is_exhausted_at_max_attempts() {
        let mut meta = RetryMetadata::new("ORD-001");
        for _ in 0..DEFAULT_MAX_ATTEMPTS {
            meta.record_failure("X", "x", Uuid::now_v7(), Uuid::now_v7());
        }
        assert!(meta.is_exhausted());
    }

    #[test]
    fn test_not_exhausted_below_max() {
        let mut meta = RetryMetadata::new("ORD-001");
        meta.record_failure("X", "x", Uuid::now_v7(), Uuid::now_v7());
        assert!(!meta.is_exhausted());
    }
}
