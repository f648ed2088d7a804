//! Aggregate persistence seam.
//!
//! One trait, two implementations (Postgres / in-memory), mirroring the
//! split the workflow runtime draws between `WorkflowEventStore`
//! implementations. `Order`, `Wave`, `PickTask`, `ConsolidationUnit` and
//! `ProcessPath` are the domain aggregates; `DeadLetterEntry`,
//! `IdempotencyRecord`, `ProcessedEvent` and `OutboxRecord` are the
//! ambient-stack rows that ride alongside them.

use async_trait::async_trait;
use uuid::Uuid;

use wms_domain::consolidation::ConsolidationUnit;
use wms_domain::dead_letter::{DeadLetterEntry, DeadLetterResolution};
use wms_domain::order::{Order, OrderStatus};
use wms_domain::pick_task::PickTask;
use wms_domain::process_path::ProcessPath;
use wms_domain::wave::Wave;
use wms_resilience::event_dedup::ProcessedEvent;
use wms_resilience::idempotency::IdempotencyRecord;
use wms_resilience::outbox::OutboxRecord;

#[derive(Debug, thiserror::Error)]
pub enum DomainStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found")]
    NotFound,
}

#[async_trait]
pub trait DomainStore: Send + Sync {
    async fn create_order(&self, order: Order) -> Result<(), DomainStoreError>;
    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, DomainStoreError>;
    async fn save_order(&self, order: Order) -> Result<(), DomainStoreError>;
    async fn list_orders_by_status(
        &self,
        status: OrderStatus,
        limit: i64,
    ) -> Result<Vec<Order>, DomainStoreError>;

    async fn create_wave(&self, wave: Wave) -> Result<(), DomainStoreError>;
    async fn get_wave(&self, wave_id: &str) -> Result<Option<Wave>, DomainStoreError>;
    async fn save_wave(&self, wave: Wave) -> Result<(), DomainStoreError>;

    async fn save_pick_task(&self, task: PickTask) -> Result<(), DomainStoreError>;
    async fn get_pick_task(&self, task_id: &str) -> Result<Option<PickTask>, DomainStoreError>;
    async fn list_pick_tasks_by_wave(&self, wave_id: &str) -> Result<Vec<PickTask>, DomainStoreError>;

    async fn save_consolidation_unit(&self, unit: ConsolidationUnit) -> Result<(), DomainStoreError>;
    async fn get_consolidation_unit(&self, unit_id: &str) -> Result<Option<ConsolidationUnit>, DomainStoreError>;

    async fn save_process_path(&self, path: ProcessPath) -> Result<(), DomainStoreError>;
    async fn get_process_path(&self, order_id: &str) -> Result<Option<ProcessPath>, DomainStoreError>;

    async fn create_dead_letter_entry(&self, entry: DeadLetterEntry) -> Result<(), DomainStoreError>;
    async fn save_dead_letter_entry(&self, entry: DeadLetterEntry) -> Result<(), DomainStoreError>;
    async fn get_dead_letter_entry(&self, entry_id: &str) -> Result<Option<DeadLetterEntry>, DomainStoreError>;
    async fn list_dead_letter_entries(
        &self,
        resolution: Option<DeadLetterResolution>,
    ) -> Result<Vec<DeadLetterEntry>, DomainStoreError>;

    async fn get_idempotency_record(&self, key: &str) -> Result<Option<IdempotencyRecord>, DomainStoreError>;
    async fn put_idempotency_record(&self, record: IdempotencyRecord) -> Result<(), DomainStoreError>;

    async fn is_event_processed(
        &self,
        consumer_group: &str,
        event_id: Uuid,
    ) -> Result<bool, DomainStoreError>;
    async fn record_processed_event(&self, event: ProcessedEvent) -> Result<(), DomainStoreError>;

    async fn insert_outbox_record(&self, record: OutboxRecord) -> Result<(), DomainStoreError>;
    async fn fetch_pending_outbox(&self, batch_size: u32) -> Result<Vec<OutboxRecord>, DomainStoreError>;
    async fn mark_outbox_published(&self, outbox_id: Uuid) -> Result<(), DomainStoreError>;
    async fn mark_outbox_failed(&self, outbox_id: Uuid) -> Result<(), DomainStoreError>;
}
