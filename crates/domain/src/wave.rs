//! Wave aggregate
//!
//! A wave batches orders into a single picking release for a zone.
//! Capacity bounds are enforced by the routing/planning workflow at
//! assignment time, not by the aggregate itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum WaveStatus {
    Planned,
    Scheduled,
    Released,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Wave {
    pub wave_id: String,
    pub zone: String,
    #[sqlx(json)]
    pub order_ids: Vec<String>,
    #[sqlx(json)]
    pub status: WaveStatus,
    pub min_capacity: u32,
    pub max_capacity: u32,
    pub tenant_id: String,
    pub facility_id: String,
    pub warehouse_id: String,
    pub created_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
}

impl Wave {
    pub fn new(
        wave_id: impl Into<String>,
        zone: impl Into<String>,
        min_capacity: u32,
        max_capacity: u32,
        tenant_id: impl Into<String>,
        facility_id: impl Into<String>,
        warehouse_id: impl Into<String>,
    ) -> Self {
        Self {
            wave_id: wave_id.into(),
            zone: zone.into(),
            order_ids: Vec::new(),
            status: WaveStatus::Planned,
            min_capacity,
            max_capacity,
            tenant_id: tenant_id.into(),
            facility_id: facility_id.into(),
            warehouse_id: warehouse_id.into(),
            created_at: Utc::now(),
            released_at: None,
        }
    }

    /// Whether another order can be assigned without breaching
    /// `max_capacity`.
    pub fn has_capacity(&self) -> bool {
        (self.order_ids.len() as u32) < self.max_capacity
    }

    pub fn assign_order(&mut self, order_id: impl Into<String>) -> bool {
        if !self.has_capacity() {
            return false;
        }
        self.order_ids.push(order_id.into());
        true
    }

    /// Whether the wave has met its minimum release threshold.
    pub fn is_releasable(&self) -> bool {
        (self.order_ids.len() as u32) >= self.min_capacity
    }

    pub fn release(&mut self) {
        self.status = WaveStatus::Released;
        self.released_at = Some(Utc::now());
    }
}
