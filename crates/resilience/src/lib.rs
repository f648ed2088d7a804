//! Idempotency layer and transactional outbox publisher for the
//! fulfillment orchestrator.

pub mod event_dedup;
pub mod idempotency;
pub mod outbox;
pub mod projection;

pub mod prelude {
    pub use crate::event_dedup::{is_duplicate, ProcessedEvent, DEDUP_TTL};
    pub use crate::idempotency::{
        evaluate, fingerprint, IdempotencyOutcome, IdempotencyRecord, IdempotencyRecordState, LOCK_TTL, RESPONSE_TTL,
    };
    pub use crate::outbox::{
        publish_batch, EventPublisher, InMemoryEventPublisher, OutboxRecord, OutboxRecordStatus, PublishError,
        DEFAULT_BATCH_SIZE, DEFAULT_POLL_INTERVAL,
    };
    pub use crate::projection::{apply_event, OrderListRow, ProjectionError, ProjectionStore};
}
