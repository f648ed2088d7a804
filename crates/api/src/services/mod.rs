//! Business logic layer: each service owns one concern and talks to
//! storage/the workflow executor directly — handlers stay thin.

pub mod dead_letter;
pub mod order_intake;
pub mod signal_bridge;

pub use dead_letter::{DeadLetterService, DeadLetterServiceError};
pub use order_intake::{OrderIntakeError, OrderIntakeService};
pub use signal_bridge::{SignalBridgeError, SignalBridgeService, SignalKind, SignalOutcome};
