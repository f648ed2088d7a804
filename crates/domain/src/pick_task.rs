//! Pick task aggregate
//!
//! A pick task is the unit of work handed to a picker: an ordered route
//! of stops, each naming a location, SKU, and quantity to pick into a
//! tote.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum PickTaskStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RouteStop {
    pub location_id: String,
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PickedLine {
    pub sku: String,
    pub quantity: u32,
    pub tote_id: String,
    pub picked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PickTask {
    pub task_id: String,
    pub order_id: String,
    pub wave_id: String,
    #[sqlx(json)]
    pub route: Vec<RouteStop>,
    #[sqlx(json)]
    pub status: PickTaskStatus,
    pub worker_id: Option<String>,
    #[sqlx(json)]
    pub picked_lines: Vec<PickedLine>,
    pub created_at: DateTime<Utc>,
}

impl PickTask {
    pub fn new(task_id: impl Into<String>, order_id: impl Into<String>, wave_id: impl Into<String>, route: Vec<RouteStop>) -> Self {
        Self {
            task_id: task_id.into(),
            order_id: order_id.into(),
            wave_id: wave_id.into(),
            route,
            status: PickTaskStatus::Pending,
            worker_id: None,
            picked_lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn assign(&mut self, worker_id: impl Into<String>) {
        self.worker_id = Some(worker_id.into());
        self.status = PickTaskStatus::Assigned;
    }

    pub fn record_pick(&mut self, sku: impl Into<String>, quantity: u32, tote_id: impl Into<String>) {
        self.status = PickTaskStatus::InProgress;
        self.picked_lines.push(PickedLine {
            sku: sku.into(),
            quantity,
            tote_id: tote_id.into(),
            picked_at: Utc::now(),
        });
    }

    /// Whether every route stop has a matching picked line for at least
    /// the requested quantity.
    pub fn is_fully_picked(&self) -> bool {
        self.route.iter().all(|stop| {
            let picked: u32 = self
                .picked_lines
                .iter()
                .filter(|line| line.sku == stop.sku)
                .map(|line| line.quantity)
                .sum();
            picked >= stop.quantity
        })
    }

    pub fn complete(&mut self) {
        self.status = PickTaskStatus::Completed;
    }
}
