//! Durable workflow definitions for the fulfillment orchestrator.
//!
//! Each module implements `wms_durable::Workflow` for one orchestration.
//! [`register_all`] wires every workflow type into a
//! `wms_durable::WorkflowExecutor` so callers don't have to enumerate
//! them by hand.

pub mod consolidation;
pub mod continuous_optimization;
pub mod fulfillment;
pub mod packing;
pub mod picking;
pub mod planning;
pub mod reprocessing;
pub mod shipping;
pub mod stock_shortage;

use wms_durable::persistence::WorkflowEventStore;
use wms_durable::WorkflowExecutor;

/// Register every workflow type this crate defines onto an executor.
pub fn register_all<S: WorkflowEventStore>(executor: &mut WorkflowExecutor<S>) {
    executor.register::<fulfillment::FulfillmentWorkflow>();
    executor.register::<planning::PlanningWorkflow>();
    executor.register::<continuous_optimization::ContinuousOptimizationWorkflow>();
    executor.register::<picking::PickingWorkflow>();
    executor.register::<consolidation::ConsolidationWorkflow>();
    executor.register::<packing::PackingWorkflow>();
    executor.register::<shipping::ShippingWorkflow>();
    executor.register::<reprocessing::ReprocessingWorkflow>();
    executor.register::<stock_shortage::StockShortageWorkflow>();
}
