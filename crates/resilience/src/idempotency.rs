//! HTTP endpoint idempotency
//!
//! Every mutating endpoint accepts an `Idempotency-Key` header. The
//! layer fingerprints `(service, endpoint, key, body-hash)` and applies
//! a lock-then-cache-response state machine so a retried request either
//! rejoins the in-flight attempt or replays its cached result verbatim.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Lock TTL for an in-flight request — if the original caller never
/// completes (e.g. the process crashed mid-request), a retry after this
/// window is allowed to re-acquire the lock and try again.
pub const LOCK_TTL: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// TTL for a cached completed response.
pub const RESPONSE_TTL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

pub fn fingerprint(service: &str, endpoint: &str, key: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(service.as_bytes());
    hasher.update(b"\0");
    hasher.update(endpoint.as_bytes());
    hasher.update(b"\0");
    hasher.update(key.as_bytes());
    hasher.update(b"\0");
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdempotencyRecordState {
    Locked,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub idempotency_key: String,
    pub fingerprint: String,
    pub state: IdempotencyRecordState,
    pub response_status: Option<u16>,
    pub response_body: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    pub fn new_locked(idempotency_key: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            idempotency_key: idempotency_key.into(),
            fingerprint: fingerprint.into(),
            state: IdempotencyRecordState::Locked,
            response_status: None,
            response_body: None,
            created_at: now,
            expires_at: now + ChronoDuration::from_std(LOCK_TTL).expect("LOCK_TTL fits in chrono::Duration"),
        }
    }

    pub fn complete(&mut self, status: u16, body: Vec<u8>) {
        self.state = IdempotencyRecordState::Completed;
        self.response_status = Some(status);
        self.response_body = Some(body);
        self.expires_at = Utc::now() + ChronoDuration::from_std(RESPONSE_TTL).expect("RESPONSE_TTL fits in chrono::Duration");
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Outcome of evaluating an idempotency key against the store before
/// handling a request.
#[derive(Debug, Clone, PartialEq)]
pub enum IdempotencyOutcome {
    /// No record, or the prior record expired — proceed and record a
    /// fresh lock.
    Proceed,
    /// Completed with the same fingerprint — replay verbatim.
    ReplayCached { status: u16, body: Vec<u8> },
    /// Locked with the same fingerprint — another attempt is in flight.
    ConflictInProgress,
    /// Completed (or locked) with a different fingerprint for the same
    /// key — the caller reused a key for a different request.
    FingerprintMismatch,
}

pub fn evaluate(existing: Option<&IdempotencyRecord>, fingerprint: &str) -> IdempotencyOutcome {
    let Some(record) = existing else {
        return IdempotencyOutcome::Proceed;
    };

    if record.is_expired() {
        return IdempotencyOutcome::Proceed;
    }

    if record.fingerprint != fingerprint {
        return IdempotencyOutcome::FingerprintMismatch;
    }

    match record.state {
        IdempotencyRecordState::Locked => IdempotencyOutcome::ConflictInProgress,
        IdempotencyRecordState::Completed => IdempotencyOutcome::ReplayCached {
            status: record.response_status.unwrap_or(200),
            body: record.response_body.clone().unwrap_or_default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_proceeds() {
        assert_eq!(evaluate(None, "fp-1"), IdempotencyOutcome::Proceed);
    }

    #[test]
    fn test_locked_same_fingerprint_is_conflict() {
        let record = IdempotencyRecord::new_locked("key-1", "fp-1");
        assert_eq!(evaluate(Some(&record), "fp-1"), IdempotencyOutcome::ConflictInProgress);
    }

    #[test]
    fn test_completed_same_fingerprint_replays() {
        let mut record = IdempotencyRecord::new_locked("key-1", "fp-1");
        record.complete(201, b"{\"orderId\":\"ORD-1\"}".to_vec());
        let outcome = evaluate(Some(&record), "fp-1");
        assert_eq!(outcome, IdempotencyOutcome::ReplayCached { status: 201, body: b"{\"orderId\":\"ORD-1\"}".to_vec() });
    }

    #[test]
    fn test_different_fingerprint_same_key_mismatches() {
        let mut record = IdempotencyRecord::new_locked("key-1", "fp-1");
        record.complete(200, vec![]);
        assert_eq!(evaluate(Some(&record), "fp-2"), IdempotencyOutcome::FingerprintMismatch);
    }

    #[test]
    fn test_expired_record_allows_proceed() {
        let mut record = IdempotencyRecord::new_locked("key-1", "fp-1");
        record.expires_at = Utc::now() - ChronoDuration::seconds(1);
        assert_eq!(evaluate(Some(&record), "fp-1"), IdempotencyOutcome::Proceed);
    }

    #[test]
    fn test_fingerprint_is_stable_for_same_inputs() {
        let a = fingerprint("api", "/orders", "key-1", b"{}");
        let b = fingerprint("api", "/orders", "key-1", b"{}");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_differs_on_body_change() {
        let a = fingerprint("api", "/orders", "key-1", b"{}");
        let b = fingerprint("api", "/orders", "key-1", b"{\"x\":1}");
        assert_ne!(a, b);
    }
}
