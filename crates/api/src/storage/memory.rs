//! In-memory `DomainStore` for dev mode and tests.

use std::collections::HashMap;
use std::sync::Mutex;

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
use wms_resilience::outbox::{OutboxRecord, OutboxRecordStatus};

use super::domain_store::{DomainStore, DomainStoreError};

#[derive(Default)]
pub struct InMemoryDomainStore {
    orders: Mutex<HashMap<String, Order>>,
    waves: Mutex<HashMap<String, Wave>>,
    pick_tasks: Mutex<HashMap<String, PickTask>>,
    consolidation_units: Mutex<HashMap<String, ConsolidationUnit>>,
    process_paths: Mutex<HashMap<String, ProcessPath>>,
    dead_letters: Mutex<HashMap<String, DeadLetterEntry>>,
    idempotency_records: Mutex<HashMap<String, IdempotencyRecord>>,
    processed_events: Mutex<HashMap<(String, Uuid), ProcessedEvent>>,
    outbox: Mutex<HashMap<Uuid, OutboxRecord>>,
}

impl InMemoryDomainStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        m.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DomainStore for InMemoryDomainStore {
    async fn create_order(&self, order: Order) -> Result<(), DomainStoreError> {
        Self::lock(&self.orders).insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, DomainStoreError> {
        Ok(Self::lock(&self.orders).get(order_id).cloned())
    }

    async fn save_order(&self, order: Order) -> Result<(), DomainStoreError> {
        Self::lock(&self.orders).insert(order.order_id.clone(), order);
        Ok(())
    }

    async fn list_orders_by_status(
        &self,
        status: OrderStatus,
        limit: i64,
    ) -> Result<Vec<Order>, DomainStoreError> {
        Ok(Self::lock(&self.orders)
            .values()
            .filter(|o| o.status == status)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn create_wave(&self, wave: Wave) -> Result<(), DomainStoreError> {
        Self::lock(&self.waves).insert(wave.wave_id.clone(), wave);
        Ok(())
    }

    async fn get_wave(&self, wave_id: &str) -> Result<Option<Wave>, DomainStoreError> {
        Ok(Self::lock(&self.waves).get(wave_id).cloned())
    }

    async fn save_wave(&self, wave: Wave) -> Result<(), DomainStoreError> {
        Self::lock(&self.waves).insert(wave.wave_id.clone(), wave);
        Ok(())
    }

    async fn save_pick_task(&self, task: PickTask) -> Result<(), DomainStoreError> {
        Self::lock(&self.pick_tasks).insert(task.task_id.clone(), task);
        Ok(())
    }

    async fn get_pick_task(&self, task_id: &str) -> Result<Option<PickTask>, DomainStoreError> {
        Ok(Self::lock(&self.pick_tasks).get(task_id).cloned())
    }

    async fn list_pick_tasks_by_wave(&self, wave_id: &str) -> Result<Vec<PickTask>, DomainStoreError> {
        Ok(Self::lock(&self.pick_tasks)
            .values()
            .filter(|t| t.wave_id == wave_id)
            .cloned()
            .collect())
    }

    async fn save_consolidation_unit(&self, unit: ConsolidationUnit) -> Result<(), DomainStoreError> {
        Self::lock(&self.consolidation_units).insert(unit.unit_id.clone(), unit);
        Ok(())
    }

    async fn get_consolidation_unit(&self, unit_id: &str) -> Result<Option<ConsolidationUnit>, DomainStoreError> {
        Ok(Self::lock(&self.consolidation_units).get(unit_id).cloned())
    }

    async fn save_process_path(&self, path: ProcessPath) -> Result<(), DomainStoreError> {
        Self::lock(&self.process_paths).insert(path.order_id.clone(), path);
        Ok(())
    }

    async fn get_process_path(&self, order_id: &str) -> Result<Option<ProcessPath>, DomainStoreError> {
        Ok(Self::lock(&self.process_paths).get(order_id).cloned())
    }

    async fn create_dead_letter_entry(&self, entry: DeadLetterEntry) -> Result<(), DomainStoreError> {
        Self::lock(&self.dead_letters).insert(entry.entry_id.clone(), entry);
        Ok(())
    }

    async fn save_dead_letter_entry(&self, entry: DeadLetterEntry) -> Result<(), DomainStoreError> {
        Self::lock(&self.dead_letters).insert(entry.entry_id.clone(), entry);
        Ok(())
    }

    async fn get_dead_letter_entry(&self, entry_id: &str) -> Result<Option<DeadLetterEntry>, DomainStoreError> {
        Ok(Self::lock(&self.dead_letters).get(entry_id).cloned())
    }

    async fn list_dead_letter_entries(
        &self,
        resolution: Option<DeadLetterResolution>,
    ) -> Result<Vec<DeadLetterEntry>, DomainStoreError> {
        Ok(Self::lock(&self.dead_letters)
            .values()
            .filter(|e| resolution.map(|r| e.resolution == r).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn get_idempotency_record(&self, key: &str) -> Result<Option<IdempotencyRecord>, DomainStoreError> {
        Ok(Self::lock(&self.idempotency_records).get(key).cloned())
    }

    async fn put_idempotency_record(&self, record: IdempotencyRecord) -> Result<(), DomainStoreError> {
        Self::lock(&self.idempotency_records).insert(record.idempotency_key.clone(), record);
        Ok(())
    }

    async fn is_event_processed(&self, consumer_group: &str, event_id: Uuid) -> Result<bool, DomainStoreError> {
        let seen = Self::lock(&self.processed_events)
            .get(&(consumer_group.to_string(), event_id))
            .cloned();
        Ok(wms_resilience::event_dedup::is_duplicate(seen.as_ref()))
    }

    async fn record_processed_event(&self, event: ProcessedEvent) -> Result<(), DomainStoreError> {
        Self::lock(&self.processed_events).insert((event.consumer_group.clone(), event.event_id), event);
        Ok(())
    }

    async fn insert_outbox_record(&self, record: OutboxRecord) -> Result<(), DomainStoreError> {
        Self::lock(&self.outbox).insert(record.outbox_id, record);
        Ok(())
    }

    async fn fetch_pending_outbox(&self, batch_size: u32) -> Result<Vec<OutboxRecord>, DomainStoreError> {
        Ok(Self::lock(&self.outbox)
            .values()
            .filter(|r| r.status == OutboxRecordStatus::Pending)
            .take(batch_size as usize)
            .cloned()
            .collect())
    }

    async fn mark_outbox_published(&self, outbox_id: Uuid) -> Result<(), DomainStoreError> {
        if let Some(record) = Self::lock(&self.outbox).get_mut(&outbox_id) {
            record.status = OutboxRecordStatus::Published;
            record.published_at = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn mark_outbox_failed(&self, outbox_id: Uuid) -> Result<(), DomainStoreError> {
        if let Some(record) = Self::lock(&self.outbox).get_mut(&outbox_id) {
            record.status = OutboxRecordStatus::Failed;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wms_domain::order::{LineItem, OrderPriority, ShipAddress};
    use wms_domain::tenancy::TenancyContext;

    fn sample_order() -> Order {
        Order::new(
            "ORD-1",
            "CUST-1",
            vec![LineItem { sku: "SKU-1".into(), quantity: 1, weight_grams: 100 }],
            ShipAddress {
                line1: "1 Main St".into(),
                line2: None,
                city: "Springfield".into(),
                region: "IL".into(),
                postal_code: "62701".into(),
                country: "US".into(),
            },
            OrderPriority::Standard,
            Utc::now(),
            TenancyContext::new("t1", "f1", "w1"),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_order_round_trips() {
        let store = InMemoryDomainStore::new();
        store.create_order(sample_order()).await.unwrap();
        let fetched = store.get_order("ORD-1").await.unwrap();
        assert_eq!(fetched.unwrap().order_id, "ORD-1");
    }

    #[tokio::test]
    async fn test_list_orders_by_status_filters() {
        let store = InMemoryDomainStore::new();
        store.create_order(sample_order()).await.unwrap();
        let received = store.list_orders_by_status(OrderStatus::Received, 10).await.unwrap();
        assert_eq!(received.len(), 1);
        let shipped = store.list_orders_by_status(OrderStatus::Shipped, 10).await.unwrap();
        assert!(shipped.is_empty());
    }
}
