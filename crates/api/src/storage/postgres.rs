//! Postgres `DomainStore`. Uses runtime `sqlx::query_as` (not the
//! compile-time-checked macro) so the crate builds without a live
//! database — the same choice the teacher's own repository layer makes.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use wms_domain::consolidation::ConsolidationUnit;
use wms_domain::dead_letter::{DeadLetterEntry, DeadLetterResolution};
use wms_domain::order::{Order, OrderStatus};
use wms_domain::pick_task::PickTask;
use wms_domain::process_path::ProcessPath;
use wms_domain::wave::Wave;
use wms_resilience::event_dedup::ProcessedEvent;
use wms_resilience::idempotency::{IdempotencyRecord, IdempotencyRecordState};
use wms_resilience::outbox::{OutboxRecord, OutboxRecordStatus};

use super::domain_store::{DomainStore, DomainStoreError};

#[derive(Clone)]
pub struct PostgresDomainStore {
    pool: PgPool,
}

impl PostgresDomainStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DomainStore for PostgresDomainStore {
    async fn create_order(&self, order: Order) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (order_id, customer_id, line_items, ship_address, priority,
                promised_delivery_at, status, wave_id, tracking_number,
                tenant_id, facility_id, warehouse_id, seller_id, channel_id,
                workflow_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&order.order_id)
        .bind(&order.customer_id)
        .bind(serde_json::to_value(&order.line_items)?)
        .bind(serde_json::to_value(&order.ship_address)?)
        .bind(serde_json::to_value(order.priority)?)
        .bind(order.promised_delivery_at)
        .bind(serde_json::to_value(order.status)?)
        .bind(&order.wave_id)
        .bind(&order.tracking_number)
        .bind(&order.tenant_id)
        .bind(&order.facility_id)
        .bind(&order.warehouse_id)
        .bind(&order.seller_id)
        .bind(&order.channel_id)
        .bind(order.workflow_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, DomainStoreError> {
        let row = sqlx::query_as::<_, Order>(
            r#"
            SELECT order_id, customer_id, line_items, ship_address, priority,
                promised_delivery_at, status, wave_id, tracking_number,
                tenant_id, facility_id, warehouse_id, seller_id, channel_id,
                workflow_id, created_at, updated_at
            FROM orders WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_order(&self, order: Order) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            UPDATE orders SET customer_id = $2, line_items = $3, ship_address = $4, priority = $5,
                promised_delivery_at = $6, status = $7, wave_id = $8, tracking_number = $9,
                workflow_id = $10, updated_at = $11
            WHERE order_id = $1
            "#,
        )
        .bind(&order.order_id)
        .bind(&order.customer_id)
        .bind(serde_json::to_value(&order.line_items)?)
        .bind(serde_json::to_value(&order.ship_address)?)
        .bind(serde_json::to_value(order.priority)?)
        .bind(order.promised_delivery_at)
        .bind(serde_json::to_value(order.status)?)
        .bind(&order.wave_id)
        .bind(&order.tracking_number)
        .bind(order.workflow_id)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_orders_by_status(&self, status: OrderStatus, limit: i64) -> Result<Vec<Order>, DomainStoreError> {
        let rows = sqlx::query_as::<_, Order>(
            r#"
            SELECT order_id, customer_id, line_items, ship_address, priority,
                promised_delivery_at, status, wave_id, tracking_number,
                tenant_id, facility_id, warehouse_id, seller_id, channel_id,
                workflow_id, created_at, updated_at
            FROM orders WHERE status = $1 ORDER BY created_at ASC LIMIT $2
            "#,
        )
        .bind(serde_json::to_value(status)?)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_wave(&self, wave: Wave) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            INSERT INTO waves (wave_id, zone, order_ids, status, min_capacity, max_capacity,
                tenant_id, facility_id, warehouse_id, created_at, released_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&wave.wave_id)
        .bind(&wave.zone)
        .bind(serde_json::to_value(&wave.order_ids)?)
        .bind(serde_json::to_value(wave.status)?)
        .bind(wave.min_capacity as i32)
        .bind(wave.max_capacity as i32)
        .bind(&wave.tenant_id)
        .bind(&wave.facility_id)
        .bind(&wave.warehouse_id)
        .bind(wave.created_at)
        .bind(wave.released_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_wave(&self, wave_id: &str) -> Result<Option<Wave>, DomainStoreError> {
        let row = sqlx::query_as::<_, Wave>(
            r#"
            SELECT wave_id, zone, order_ids, status, min_capacity, max_capacity,
                tenant_id, facility_id, warehouse_id, created_at, released_at
            FROM waves WHERE wave_id = $1
            "#,
        )
        .bind(wave_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_wave(&self, wave: Wave) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            UPDATE waves SET order_ids = $2, status = $3, released_at = $4
            WHERE wave_id = $1
            "#,
        )
        .bind(&wave.wave_id)
        .bind(serde_json::to_value(&wave.order_ids)?)
        .bind(serde_json::to_value(wave.status)?)
        .bind(wave.released_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_pick_task(&self, task: PickTask) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            INSERT INTO pick_tasks (task_id, order_id, wave_id, route, status, worker_id, picked_lines, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (task_id) DO UPDATE SET
                route = EXCLUDED.route, status = EXCLUDED.status,
                worker_id = EXCLUDED.worker_id, picked_lines = EXCLUDED.picked_lines
            "#,
        )
        .bind(&task.task_id)
        .bind(&task.order_id)
        .bind(&task.wave_id)
        .bind(serde_json::to_value(&task.route)?)
        .bind(serde_json::to_value(task.status)?)
        .bind(&task.worker_id)
        .bind(serde_json::to_value(&task.picked_lines)?)
        .bind(task.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_pick_task(&self, task_id: &str) -> Result<Option<PickTask>, DomainStoreError> {
        let row = sqlx::query_as::<_, PickTask>(
            r#"
            SELECT task_id, order_id, wave_id, route, status, worker_id, picked_lines, created_at
            FROM pick_tasks WHERE task_id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_pick_tasks_by_wave(&self, wave_id: &str) -> Result<Vec<PickTask>, DomainStoreError> {
        let rows = sqlx::query_as::<_, PickTask>(
            r#"
            SELECT task_id, order_id, wave_id, route, status, worker_id, picked_lines, created_at
            FROM pick_tasks WHERE wave_id = $1
            "#,
        )
        .bind(wave_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn save_consolidation_unit(&self, unit: ConsolidationUnit) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            INSERT INTO consolidation_units (unit_id, order_id, destination_bin_id, expected_items, consolidated_items, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (unit_id) DO UPDATE SET
                consolidated_items = EXCLUDED.consolidated_items, status = EXCLUDED.status
            "#,
        )
        .bind(&unit.unit_id)
        .bind(&unit.order_id)
        .bind(&unit.destination_bin_id)
        .bind(serde_json::to_value(&unit.expected_items)?)
        .bind(serde_json::to_value(&unit.consolidated_items)?)
        .bind(serde_json::to_value(unit.status)?)
        .bind(unit.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_consolidation_unit(&self, unit_id: &str) -> Result<Option<ConsolidationUnit>, DomainStoreError> {
        let row = sqlx::query_as::<_, ConsolidationUnit>(
            r#"
            SELECT unit_id, order_id, destination_bin_id, expected_items, consolidated_items, status, created_at
            FROM consolidation_units WHERE unit_id = $1
            "#,
        )
        .bind(unit_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_process_path(&self, path: ProcessPath) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            INSERT INTO process_paths (order_id, current_tier, history, fallback_station_ids)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO UPDATE SET
                current_tier = EXCLUDED.current_tier, history = EXCLUDED.history
            "#,
        )
        .bind(&path.order_id)
        .bind(serde_json::to_value(path.current_tier)?)
        .bind(serde_json::to_value(&path.history)?)
        .bind(serde_json::to_value(&path.fallback_station_ids)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_process_path(&self, order_id: &str) -> Result<Option<ProcessPath>, DomainStoreError> {
        let row = sqlx::query_as::<_, ProcessPath>(
            r#"
            SELECT order_id, current_tier, history, fallback_station_ids
            FROM process_paths WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_dead_letter_entry(&self, entry: DeadLetterEntry) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            INSERT INTO dead_letter_entries (entry_id, order_id, order_snapshot, retry_history, resolution, notes, resolved_by, created_at, resolved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&entry.entry_id)
        .bind(&entry.order_id)
        .bind(serde_json::to_value(&entry.order_snapshot)?)
        .bind(serde_json::to_value(&entry.retry_history)?)
        .bind(serde_json::to_value(entry.resolution)?)
        .bind(&entry.notes)
        .bind(&entry.resolved_by)
        .bind(entry.created_at)
        .bind(entry.resolved_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_dead_letter_entry(&self, entry: DeadLetterEntry) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            UPDATE dead_letter_entries SET resolution = $2, notes = $3, resolved_by = $4, resolved_at = $5
            WHERE entry_id = $1
            "#,
        )
        .bind(&entry.entry_id)
        .bind(serde_json::to_value(entry.resolution)?)
        .bind(&entry.notes)
        .bind(&entry.resolved_by)
        .bind(entry.resolved_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_dead_letter_entry(&self, entry_id: &str) -> Result<Option<DeadLetterEntry>, DomainStoreError> {
        let row = sqlx::query_as::<_, DeadLetterEntry>(
            r#"
            SELECT entry_id, order_id, order_snapshot, retry_history, resolution, notes, resolved_by, created_at, resolved_at
            FROM dead_letter_entries WHERE entry_id = $1
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_dead_letter_entries(&self, resolution: Option<DeadLetterResolution>) -> Result<Vec<DeadLetterEntry>, DomainStoreError> {
        let rows = match resolution {
            Some(r) => {
                sqlx::query_as::<_, DeadLetterEntry>(
                    r#"
                    SELECT entry_id, order_id, order_snapshot, retry_history, resolution, notes, resolved_by, created_at, resolved_at
                    FROM dead_letter_entries WHERE resolution = $1 ORDER BY created_at DESC
                    "#,
                )
                .bind(serde_json::to_value(r)?)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DeadLetterEntry>(
                    r#"
                    SELECT entry_id, order_id, order_snapshot, retry_history, resolution, notes, resolved_by, created_at, resolved_at
                    FROM dead_letter_entries ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn get_idempotency_record(&self, key: &str) -> Result<Option<IdempotencyRecord>, DomainStoreError> {
        let row = sqlx::query(
            r#"
            SELECT idempotency_key, fingerprint, state, response_status, response_body, created_at, expires_at
            FROM idempotency_records WHERE idempotency_key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let state: String = row.try_get("state")?;
        Ok(Some(IdempotencyRecord {
            idempotency_key: row.try_get("idempotency_key")?,
            fingerprint: row.try_get("fingerprint")?,
            state: if state == "completed" { IdempotencyRecordState::Completed } else { IdempotencyRecordState::Locked },
            response_status: row.try_get::<Option<i32>, _>("response_status")?.map(|s| s as u16),
            response_body: row.try_get("response_body")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        }))
    }

    async fn put_idempotency_record(&self, record: IdempotencyRecord) -> Result<(), DomainStoreError> {
        let state = match record.state {
            IdempotencyRecordState::Locked => "locked",
            IdempotencyRecordState::Completed => "completed",
        };
        sqlx::query(
            r#"
            INSERT INTO idempotency_records (idempotency_key, fingerprint, state, response_status, response_body, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (idempotency_key) DO UPDATE SET
                fingerprint = EXCLUDED.fingerprint, state = EXCLUDED.state,
                response_status = EXCLUDED.response_status, response_body = EXCLUDED.response_body,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&record.idempotency_key)
        .bind(&record.fingerprint)
        .bind(state)
        .bind(record.response_status.map(|s| s as i32))
        .bind(&record.response_body)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_event_processed(&self, consumer_group: &str, event_id: Uuid) -> Result<bool, DomainStoreError> {
        let row = sqlx::query(
            r#"SELECT expires_at FROM processed_messages WHERE consumer_group = $1 AND event_id = $2"#,
        )
        .bind(consumer_group)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => {
                let expires_at: chrono::DateTime<chrono::Utc> = row.try_get("expires_at")?;
                Ok(chrono::Utc::now() < expires_at)
            }
            None => Ok(false),
        }
    }

    async fn record_processed_event(&self, event: ProcessedEvent) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            INSERT INTO processed_messages (consumer_group, event_id, processed_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (consumer_group, event_id) DO NOTHING
            "#,
        )
        .bind(&event.consumer_group)
        .bind(event.event_id)
        .bind(event.processed_at)
        .bind(event.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_outbox_record(&self, record: OutboxRecord) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"
            INSERT INTO outbox_records (outbox_id, topic, envelope, status, attempts, created_at, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.outbox_id)
        .bind(&record.topic)
        .bind(serde_json::to_value(&record.envelope)?)
        .bind(outbox_status_str(record.status))
        .bind(record.attempts as i32)
        .bind(record.created_at)
        .bind(record.published_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_pending_outbox(&self, batch_size: u32) -> Result<Vec<OutboxRecord>, DomainStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT outbox_id, topic, envelope, status, attempts, created_at, published_at
            FROM outbox_records WHERE status = 'pending' ORDER BY created_at ASC LIMIT $1
            "#,
        )
        .bind(batch_size as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(OutboxRecord {
                    outbox_id: row.try_get("outbox_id")?,
                    topic: row.try_get("topic")?,
                    envelope: serde_json::from_value(row.try_get("envelope")?)?,
                    status: OutboxRecordStatus::Pending,
                    attempts: row.try_get::<i32, _>("attempts")? as u32,
                    created_at: row.try_get("created_at")?,
                    published_at: row.try_get("published_at")?,
                })
            })
            .collect()
    }

    async fn mark_outbox_published(&self, outbox_id: Uuid) -> Result<(), DomainStoreError> {
        sqlx::query(
            r#"UPDATE outbox_records SET status = 'published', published_at = $2 WHERE outbox_id = $1"#,
        )
        .bind(outbox_id)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn mark_outbox_failed(&self, outbox_id: Uuid) -> Result<(), DomainStoreError> {
        sqlx::query(r#"UPDATE outbox_records SET status = 'failed' WHERE outbox_id = $1"#)
            .bind(outbox_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn outbox_status_str(status: OutboxRecordStatus) -> &'static str {
    match status {
        OutboxRecordStatus::Pending => "pending",
        OutboxRecordStatus::Published => "published",
        OutboxRecordStatus::Failed => "failed",
    }
}
