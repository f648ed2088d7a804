//! Dead-letter promotion and resolution
//!
//! When retries exhaust, or the failure classifier marks a failure as
//! terminal outright (e.g. `validation_failed`), the order's retry
//! metadata is snapshotted into a [`DeadLetterEntry`], retry metadata is
//! deleted, and the order is marked `dead_letter`.

use uuid::Uuid;

use wms_domain::dead_letter::{DeadLetterEntry, DeadLetterResolution};
use wms_domain::order::Order;
use wms_domain::retry::RetryMetadata;

/// Failure classes that go straight to the dead-letter queue without
/// ever being eligible for reprocessing.
pub const TERMINAL_FAILURE_CLASSES: &[&str] = &["validation_failed", "cancelled_by_user"];

pub fn is_terminal_failure(failure_code: &str) -> bool {
    TERMINAL_FAILURE_CLASSES.contains(&failure_code)
}

/// Decide whether an order with the given failure code and retry
/// history should be promoted to the dead-letter queue instead of
/// requeued.
pub fn should_promote(failure_code: &str, retry: &RetryMetadata) -> bool {
    is_terminal_failure(failure_code) || retry.is_exhausted()
}

pub fn promote(order: Order, retry: RetryMetadata) -> DeadLetterEntry {
    let entry_id = Uuid::now_v7().to_string();
    DeadLetterEntry::new(entry_id, order, retry)
}

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("dead-letter entry {0} is already resolved")]
    AlreadyResolved(String),
}

/// Resolve a dead-letter entry. `manual_retry` callers are expected to
/// separately start a fresh fulfillment workflow for the order — this
/// function only updates the entry's resolution record.
pub fn resolve(
    entry: &mut DeadLetterEntry,
    resolution: DeadLetterResolution,
    resolved_by: impl Into<String>,
    notes: Option<String>,
) -> Result<(), ResolutionError> {
    if entry.is_resolved() {
        return Err(ResolutionError::AlreadyResolved(entry.entry_id.clone()));
    }
    entry.resolve(resolution, resolved_by, notes);
    Ok(())
}
