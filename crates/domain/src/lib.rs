//! Domain aggregates and event envelope for the fulfillment orchestrator.
//!
//! This crate has no persistence or transport dependencies beyond what's
//! needed to read/write rows and (de)serialize events — it is imported by
//! `wms-workflows`, `wms-routing`, `wms-reprocessing`, `wms-resilience`,
//! and `wms-api` alike so that aggregate shapes stay in one place.

pub mod consolidation;
pub mod dead_letter;
pub mod event;
pub mod order;
pub mod pick_task;
pub mod process_path;
pub mod retry;
pub mod tenancy;
pub mod wave;

pub mod prelude {
    pub use crate::consolidation::{ConsolidatedItem, ConsolidationStatus, ConsolidationUnit, ExpectedItem};
    pub use crate::dead_letter::{DeadLetterEntry, DeadLetterResolution};
    pub use crate::event::{event_types, topics, EventEnvelope};
    pub use crate::order::{LineItem, Order, OrderPriority, OrderStatus, ShipAddress};
    pub use crate::pick_task::{PickTask, PickTaskStatus, PickedLine, RouteStop};
    pub use crate::process_path::{EscalationTier, ProcessPath, TierChange};
    pub use crate::retry::{RetryMetadata, DEFAULT_MAX_ATTEMPTS};
    pub use crate::tenancy::TenancyContext;
    pub use crate::wave::{Wave, WaveStatus};
}
