//! Reprocessing and dead-letter queue for the fulfillment orchestrator.

pub mod dead_letter_queue;
pub mod postgres;
pub mod store;

pub mod prelude {
    pub use crate::dead_letter_queue::{is_terminal_failure, promote, resolve, ResolutionError, TERMINAL_FAILURE_CLASSES};
    pub use crate::postgres::PostgresReprocessingStore;
    pub use crate::store::{is_eligible_failure, EligiblePage, ReprocessingError, ReprocessingStore, ELIGIBLE_FAILURE_CLASSES};
}
