//! Eligible-order queries, the scheduled batch's overlap guard, and the
//! per-order advisory lock used while resetting and requeuing a single
//! order.

use async_trait::async_trait;
use uuid::Uuid;

use wms_domain::retry::RetryMetadata;

/// Failure classes eligible for reprocessing. Not eligible:
/// `validation_failed`, `cancelled_by_user` — both represent a decision,
/// not a transient failure, and reprocessing would just repeat it.
pub const ELIGIBLE_FAILURE_CLASSES: &[&str] = &["wave_timeout", "pick_timeout", "transient_downstream"];

pub fn is_eligible_failure(failure_code: &str, retry: &RetryMetadata) -> bool {
    ELIGIBLE_FAILURE_CLASSES.contains(&failure_code) && !retry.is_exhausted()
}

#[derive(Debug, thiserror::Error)]
pub enum ReprocessingError {
    #[error("database error: {0}")]
    Database(String),
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("advisory lock for order {0} held by another run")]
    LockContended(String),
}

/// One page of an eligible-orders scan.
#[derive(Debug, Clone)]
pub struct EligiblePage {
    pub order_ids: Vec<String>,
    pub has_more: bool,
}

/// Persistence surface the batch-reprocessing workflow's activities are
/// implemented against.
#[async_trait]
pub trait ReprocessingStore: Send + Sync {
    /// Page through orders whose retry metadata shows an eligible
    /// failure class and remaining attempts.
    async fn fetch_eligible_page(&self, facility_id: &str, page: u32, page_size: u32) -> Result<EligiblePage, ReprocessingError>;

    /// Whether a scheduled run for this tick already holds the
    /// facility-level run lock — implements the `SKIP` overlap policy:
    /// a duplicate scheduled firing skips rather than queues.
    async fn try_acquire_run_lock(&self, facility_id: &str, run_id: Uuid) -> Result<bool, ReprocessingError>;

    async fn release_run_lock(&self, facility_id: &str, run_id: Uuid) -> Result<(), ReprocessingError>;

    /// Reset the order aggregate to a safe pre-step state and increment
    /// retry metadata, inside one transaction guarded by a per-order
    /// Postgres advisory lock so a concurrent manual-retry resolution
    /// can't race the scheduled pass for the same order. Starting the
    /// fresh fulfillment workflow is the caller's responsibility — this
    /// store has no access to a `WorkflowExecutor`, so it only leaves the
    /// aggregate ready to be re-fulfilled.
    async fn requeue_order(&self, order_id: &str) -> Result<(), ReprocessingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_eligible_failure_respects_retry_budget() {
        let mut retry = RetryMetadata::new("ORD-1");
        assert!(is_eligible_failure("wave_timeout", &retry));
        for _ in 0..5 {
            retry.record_failure("wave_timeout", "timeout", Uuid::now_v7(), Uuid::now_v7());
        }
        assert!(!is_eligible_failure("wave_timeout", &retry));
    }

    #[test]
    fn test_validation_failed_never_eligible() {
        let retry = RetryMetadata::new("ORD-1");
        assert!(!is_eligible_failure("validation_failed", &retry));
        assert!(!is_eligible_failure("cancelled_by_user", &retry));
    }
}
