//! Persistence layer: two seams, two backends each.
//!
//! [`domain_store::DomainStore`] persists the fulfillment aggregates
//! (orders, waves, pick tasks, consolidation units, process paths) and
//! the ambient-stack rows that ride alongside them (dead letters,
//! idempotency records, processed events, outbox records).
//! [`orchestrator_store::OrchestratorStore`] wraps the workflow event
//! store the durable executor itself drives.

pub mod domain_store;
pub mod memory;
pub mod orchestrator_store;
pub mod postgres;

pub use domain_store::{DomainStore, DomainStoreError};
pub use memory::InMemoryDomainStore;
pub use orchestrator_store::OrchestratorStore;
pub use postgres::PostgresDomainStore;
