//! Fulfillment workflow — the canonical orchestration
//!
//! ```text
//! received -> validated -> wave_assigned -> routed -> picking -> consolidated -> packed -> shipped -> completed
//!                                         \
//!                                          failed -> compensating -> cancelled
//! ```
//!
//! Each numbered step below corresponds 1:1 to an activity dispatch or
//! signal await. The workflow itself never touches wall-clock time,
//! randomness, or external state directly — everything nondeterministic
//! is routed through `WorkflowAction`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use wms_domain::order::OrderPriority;
use wms_durable::prelude::*;

/// Input to start a fulfillment workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentInput {
    pub order_id: String,
    pub priority: OrderPriority,
    pub is_multi_item: bool,
    pub requires_gift_wrap: bool,
}

/// Terminal result of a fulfillment workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentResult {
    pub order_id: String,
    pub tracking_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Step {
    Validating,
    ReservingInventory,
    AwaitingWaveAssignment,
    CalculatingRoute,
    Picking,
    AwaitingTotes,
    AwaitingConsolidation,
    Packing,
    AwaitingGiftWrap,
    Shipping,
    Completed,
    Compensating,
    Cancelled,
    Failed,
}

pub struct FulfillmentWorkflow {
    input: FulfillmentInput,
    step: Step,
    wave_id: Option<String>,
    routes: Vec<String>,
    tracking_number: Option<String>,
    failure: Option<WorkflowError>,
}

impl FulfillmentWorkflow {
    fn validate_activity(&self) -> WorkflowAction {
        WorkflowAction::ScheduleActivity {
            activity_id: "validate_order".into(),
            activity_type: "ValidateOrder".into(),
            input: json!({ "orderId": self.input.order_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::no_retry()),
        }
    }

    fn reserve_inventory_activity(&self) -> WorkflowAction {
        WorkflowAction::ScheduleActivity {
            activity_id: "reserve_inventory".into(),
            activity_type: "ReserveInventory".into(),
            input: json!({ "orderId": self.input.order_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
        }
    }

    fn wave_assignment_timer(&self) -> WorkflowAction {
        WorkflowAction::timer(
            "wave_assignment_timeout",
            self.input.priority.wave_assignment_timeout(),
        )
    }

    fn calculate_route_activity(&self) -> WorkflowAction {
        WorkflowAction::ScheduleActivity {
            activity_id: "calculate_route".into(),
            activity_type: "CalculateRoute".into(),
            input: json!({ "orderId": self.input.order_id, "waveId": self.wave_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
        }
    }

    fn spawn_picking_children(&self) -> Vec<WorkflowAction> {
        self.routes
            .iter()
            .map(|route_id| WorkflowAction::ScheduleChildWorkflow {
                workflow_id: format!("picking-{}-{}", self.input.order_id, route_id),
                workflow_type: "picking".into(),
                input: json!({ "orderId": self.input.order_id, "routeId": route_id }),
            })
            .collect()
    }

    fn spawn_consolidation_child(&self) -> WorkflowAction {
        WorkflowAction::ScheduleChildWorkflow {
            workflow_id: format!("consolidation-{}", self.input.order_id),
            workflow_type: "consolidation".into(),
            input: json!({ "orderId": self.input.order_id }),
        }
    }

    fn spawn_packing_child(&self) -> WorkflowAction {
        WorkflowAction::ScheduleChildWorkflow {
            workflow_id: format!("packing-{}", self.input.order_id),
            workflow_type: "packing".into(),
            input: json!({
                "orderId": self.input.order_id,
                "requiresGiftWrap": self.input.requires_gift_wrap,
            }),
        }
    }

    /// Marks the order shipped and produces its tracking number. Dispatched
    /// directly rather than via a child workflow: the engine's
    /// `ScheduleChildWorkflow` never reports a child's completion back to
    /// the parent, so a shipping step modeled as a child can never resolve.
    fn mark_order_shipped_activity(&self) -> WorkflowAction {
        WorkflowAction::ScheduleActivity {
            activity_id: "mark_order_shipped".into(),
            activity_type: "MarkOrderShipped".into(),
            input: json!({ "orderId": self.input.order_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
        }
    }

    /// Compensation branch: release inventory, cancel the order, notify
    /// the customer. Each compensation activity is independently
    /// retried under a conservative policy and failures do not block
    /// the remaining compensations (best-effort, at-least-once).
    fn compensate(&mut self, reason: impl Into<String>) -> Vec<WorkflowAction> {
        self.step = Step::Compensating;
        self.failure = Some(WorkflowError::new(reason.into()));
        let conservative = ActivityOptions::default().with_retry(RetryPolicy::conservative());
        vec![
            WorkflowAction::ScheduleActivity {
                activity_id: "release_inventory_reservation".into(),
                activity_type: "ReleaseInventoryReservation".into(),
                input: json!({ "orderId": self.input.order_id }),
                options: conservative.clone(),
            },
            WorkflowAction::ScheduleActivity {
                activity_id: "cancel_order".into(),
                activity_type: "CancelOrder".into(),
                input: json!({ "orderId": self.input.order_id }),
                options: conservative.clone(),
            },
            WorkflowAction::ScheduleActivity {
                activity_id: "notify_customer_cancellation".into(),
                activity_type: "NotifyCustomer".into(),
                input: json!({ "orderId": self.input.order_id }),
                options: conservative,
            },
        ]
    }
}

impl Workflow for FulfillmentWorkflow {
    const TYPE: &'static str = "order_fulfillment";
    type Input = FulfillmentInput;
    type Output = FulfillmentResult;

    fn new(input: Self::Input) -> Self {
        Self {
            input,
            step: Step::Validating,
            wave_id: None,
            routes: Vec::new(),
            tracking_number: None,
            failure: None,
        }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![self.validate_activity()]
    }

    fn on_activity_completed(&mut self, activity_id: &str, result: serde_json::Value) -> Vec<WorkflowAction> {
        match (self.step, activity_id) {
            (Step::Validating, "validate_order") => {
                self.step = Step::ReservingInventory;
                vec![self.reserve_inventory_activity()]
            }
            (Step::ReservingInventory, "reserve_inventory") => {
                self.step = Step::AwaitingWaveAssignment;
                vec![self.wave_assignment_timer()]
            }
            (Step::CalculatingRoute, "calculate_route") => {
                self.routes = result["routes"]
                    .as_array()
                    .map(|rs| rs.iter().filter_map(|r| r.as_str().map(String::from)).collect())
                    .unwrap_or_else(|| vec!["default".to_string()]);
                self.step = Step::Picking;
                self.spawn_picking_children()
            }
            (Step::Shipping, "mark_order_shipped") => {
                self.tracking_number = result["trackingNumber"].as_str().map(String::from);
                self.step = Step::Completed;
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_activity_failed(&mut self, activity_id: &str, error: &ActivityError) -> Vec<WorkflowAction> {
        match (self.step, activity_id) {
            (Step::Validating, _) => self.compensate(format!("validation failed: {error}")),
            (Step::ReservingInventory, _) => {
                vec![WorkflowAction::ScheduleChildWorkflow {
                    workflow_id: format!("backorder-{}", self.input.order_id),
                    workflow_type: "stock_shortage".into(),
                    input: json!({ "orderId": self.input.order_id }),
                }]
            }
            _ => self.compensate(format!("{activity_id} failed: {error}")),
        }
    }

    fn on_timer_fired(&mut self, timer_id: &str) -> Vec<WorkflowAction> {
        if timer_id == "wave_assignment_timeout" && self.step == Step::AwaitingWaveAssignment {
            return self.compensate("wave_timeout");
        }
        vec![]
    }

    fn on_signal(&mut self, signal: &WorkflowSignal) -> Vec<WorkflowAction> {
        match (self.step, signal.signal_type.as_str()) {
            (Step::AwaitingWaveAssignment, "waveAssigned") => {
                self.wave_id = signal.payload["waveId"].as_str().map(String::from);
                self.step = Step::CalculatingRoute;
                vec![self.calculate_route_activity()]
            }
            (Step::Picking, "pickCompleted") => {
                if self.input.is_multi_item {
                    self.step = Step::AwaitingTotes;
                    vec![self.spawn_consolidation_child()]
                } else {
                    self.step = Step::Packing;
                    vec![self.spawn_packing_child()]
                }
            }
            (Step::AwaitingTotes, "toteArrived") => vec![],
            (Step::AwaitingTotes, "consolidationCompleted") => {
                self.step = Step::Packing;
                vec![self.spawn_packing_child()]
            }
            (Step::Packing, "giftWrapCompleted") if self.input.requires_gift_wrap => vec![],
            (Step::Packing, "packingCompleted") => {
                self.step = Step::Shipping;
                vec![self.mark_order_shipped_activity()]
            }
            _ => vec![],
        }
    }

    fn is_completed(&self) -> bool {
        matches!(self.step, Step::Completed | Step::Cancelled)
    }

    fn result(&self) -> Option<Self::Output> {
        if self.step == Step::Completed {
            self.tracking_number.clone().map(|tracking_number| FulfillmentResult {
                order_id: self.input.order_id.clone(),
                tracking_number,
            })
        } else {
            None
        }
    }

    fn error(&self) -> Option<WorkflowError> {
        self.failure.clone()
    }
}

/// Maps order priority to the pick-completion signal-await timeout. Kept
/// as a free function so the routing/reprocessing crates can reuse the
/// same schedule without depending on the workflow type itself.
pub fn pick_completion_timeout(priority: OrderPriority) -> Duration {
    priority.pick_completion_timeout()
}
