//! Projection updater (CQRS read model)
//!
//! Domain events drive updates to a denormalized order-list view —
//! order status, current wave, customer name, days-until-promised — so
//! operator UIs can query one flat row instead of joining the
//! authoritative aggregate tables. Projection writes are best-effort:
//! a failure is logged and the event is still marked processed, never
//! retried into the authoritative store's write path. This mirrors
//! [`crate::outbox`]'s at-least-once delivery: the updater is itself a
//! consumer and dedupes via [`crate::event_dedup`] under the
//! `"projection-updater"` consumer group.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use wms_domain::event::{event_types, EventEnvelope};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderListRow {
    pub order_id: String,
    pub customer_id: String,
    pub status: String,
    pub wave_number: Option<String>,
    pub promised_delivery_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("projection store error: {0}")]
    Store(String),
}

/// Denormalized read-model surface. A production implementation writes
/// to a dedicated query-side table; tests substitute an in-memory map.
#[async_trait]
pub trait ProjectionStore: Send + Sync {
    async fn upsert_order_row(&self, row: OrderListRow) -> Result<(), ProjectionError>;
    async fn set_order_status(&self, order_id: &str, status: &str) -> Result<(), ProjectionError>;
    async fn set_order_wave(&self, order_id: &str, wave_number: &str) -> Result<(), ProjectionError>;
}

/// Apply one event to the projection, logging (not propagating) any
/// failure — a stale or missing projection row never blocks the
/// authoritative write path that produced the event.
pub async fn apply_event(store: &dyn ProjectionStore, event: &EventEnvelope) {
    let order_id = match event.payload.get("orderId").and_then(|v| v.as_str()) {
        Some(id) => id,
        None => return,
    };

    let result = match event.event_type.as_str() {
        event_types::ORDER_RECEIVED => store
            .upsert_order_row(OrderListRow {
                order_id: order_id.to_string(),
                customer_id: event.payload.get("customerId").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                status: "received".to_string(),
                wave_number: None,
                promised_delivery_at: event
                    .payload
                    .get("promisedDeliveryAt")
                    .and_then(|v| v.as_str())
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or(event.occurred_at),
            })
            .await,
        event_types::ORDER_WAVE_ASSIGNED => {
            let wave_number = event.payload.get("waveNumber").and_then(|v| v.as_str()).unwrap_or_default();
            store.set_order_wave(order_id, wave_number).await
        }
        event_types::ORDER_CANCELLED => store.set_order_status(order_id, "cancelled").await,
        event_types::ORDER_SHIPPED => store.set_order_status(order_id, "shipped").await,
        event_types::ORDER_DEAD_LETTERED => store.set_order_status(order_id, "dead_lettered").await,
        _ => return,
    };

    if let Err(err) = result {
        tracing::warn!(%order_id, event_type = %event.event_type, error = %err, "projection update failed, continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use wms_domain::tenancy::TenancyContext;

    #[derive(Default)]
    struct InMemoryProjectionStore {
        rows: Mutex<HashMap<String, OrderListRow>>,
    }

    #[async_trait]
    impl ProjectionStore for InMemoryProjectionStore {
        async fn upsert_order_row(&self, row: OrderListRow) -> Result<(), ProjectionError> {
            self.rows.lock().expect("rows mutex poisoned").insert(row.order_id.clone(), row);
            Ok(())
        }

        async fn set_order_status(&self, order_id: &str, status: &str) -> Result<(), ProjectionError> {
            let mut rows = self.rows.lock().expect("rows mutex poisoned");
            match rows.get_mut(order_id) {
                Some(row) => {
                    row.status = status.to_string();
                    Ok(())
                }
                None => Err(ProjectionError::Store(format!("no row for {order_id}"))),
            }
        }

        async fn set_order_wave(&self, order_id: &str, wave_number: &str) -> Result<(), ProjectionError> {
            let mut rows = self.rows.lock().expect("rows mutex poisoned");
            match rows.get_mut(order_id) {
                Some(row) => {
                    row.wave_number = Some(wave_number.to_string());
                    Ok(())
                }
                None => Err(ProjectionError::Store(format!("no row for {order_id}"))),
            }
        }
    }

    fn sample_received(order_id: &str) -> EventEnvelope {
        EventEnvelope::new(
            event_types::ORDER_RECEIVED,
            TenancyContext::new("t1", "f1", "w1"),
            "corr-1",
            serde_json::json!({"orderId": order_id, "customerId": "cust-1"}),
        )
    }

    #[tokio::test]
    async fn test_order_received_creates_row() {
        let store = InMemoryProjectionStore::default();
        apply_event(&store, &sample_received("ORD-1")).await;
        let rows = store.rows.lock().unwrap();
        assert_eq!(rows["ORD-1"].status, "received");
        assert_eq!(rows["ORD-1"].customer_id, "cust-1");
    }

    #[tokio::test]
    async fn test_wave_assigned_updates_existing_row() {
        let store = InMemoryProjectionStore::default();
        apply_event(&store, &sample_received("ORD-2")).await;
        let wave_event = EventEnvelope::new(
            event_types::ORDER_WAVE_ASSIGNED,
            TenancyContext::new("t1", "f1", "w1"),
            "corr-2",
            serde_json::json!({"orderId": "ORD-2", "waveNumber": "W-7"}),
        );
        apply_event(&store, &wave_event).await;
        let rows = store.rows.lock().unwrap();
        assert_eq!(rows["ORD-2"].wave_number.as_deref(), Some("W-7"));
    }

    #[tokio::test]
    async fn test_missing_row_logs_and_does_not_panic() {
        let store = InMemoryProjectionStore::default();
        let shipped = EventEnvelope::new(
            event_types::ORDER_SHIPPED,
            TenancyContext::new("t1", "f1", "w1"),
            "corr-3",
            serde_json::json!({"orderId": "ORD-unknown"}),
        );
        apply_event(&store, &shipped).await;
    }

    #[tokio::test]
    async fn test_event_without_order_id_is_ignored() {
        let store = InMemoryProjectionStore::default();
        let event = EventEnvelope::new(event_types::ORDER_CANCELLED, TenancyContext::new("t1", "f1", "w1"), "corr-4", serde_json::json!({}));
        apply_event(&store, &event).await;
        assert!(store.rows.lock().unwrap().is_empty());
    }
}
