//! Event-consumer idempotency
//!
//! Each consumer group maintains a per-event-ID dedup entry with a 24h
//! TTL. Handlers check-then-record atomically so a redelivered event
//! (at-least-once publishing, see [`crate::outbox`]) short-circuits
//! instead of reapplying its side effect.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use uuid::Uuid;

pub const DEDUP_TTL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct ProcessedEvent {
    pub consumer_group: String,
    pub event_id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ProcessedEvent {
    pub fn new(consumer_group: impl Into<String>, event_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            consumer_group: consumer_group.into(),
            event_id,
            processed_at: now,
            expires_at: now + ChronoDuration::from_std(DEDUP_TTL).expect("DEDUP_TTL fits in chrono::Duration"),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Check-then-record against an in-memory snapshot of seen events for a
/// consumer group. A real handler does this atomically against the
/// store (`INSERT ... ON CONFLICT DO NOTHING` and inspect rows
/// affected); this free function captures the decision logic so it's
/// testable without a database.
pub fn is_duplicate(already_seen: Option<&ProcessedEvent>) -> bool {
    match already_seen {
        Some(seen) => !seen.is_expired(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_event_is_not_duplicate() {
        assert!(!is_duplicate(None));
    }

    #[test]
    fn test_seen_event_is_duplicate() {
        let seen = ProcessedEvent::new("projection-updater", Uuid::now_v7());
        assert!(is_duplicate(Some(&seen)));
    }

    #[test]
    fn test_expired_entry_is_not_duplicate() {
        let mut seen = ProcessedEvent::new("projection-updater", Uuid::now_v7());
        seen.expires_at = Utc::now() - ChronoDuration::seconds(1);
        assert!(!is_duplicate(Some(&seen)));
    }
}
