//! Stock shortage / backorder workflow
//!
//! Spawned by the fulfillment workflow when `ReserveInventory` fails
//! terminally with insufficient stock. Waits for inventory to be
//! replenished, then signals the parent to resume — modeled here as a
//! standalone workflow whose completion the parent does not block on
//! (detached child per the child-workflow lifecycle rules).

use serde::{Deserialize, Serialize};
use serde_json::json;

use wms_durable::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockShortageInput {
    pub order_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    AwaitingReplenishment,
    Completed,
}

pub struct StockShortageWorkflow {
    input: StockShortageInput,
    step: Step,
}

impl Workflow for StockShortageWorkflow {
    const TYPE: &'static str = "stock_shortage";
    type Input = StockShortageInput;
    type Output = ();

    fn new(input: Self::Input) -> Self {
        Self { input, step: Step::AwaitingReplenishment }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![WorkflowAction::ScheduleActivity {
            activity_id: "monitor_replenishment".into(),
            activity_type: "MonitorInventoryReplenishment".into(),
            input: json!({ "orderId": self.input.order_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::conservative()),
        }]
    }

    fn on_activity_completed(&mut self, activity_id: &str, _result: serde_json::Value) -> Vec<WorkflowAction> {
        if self.step == Step::AwaitingReplenishment && activity_id == "monitor_replenishment" {
            self.step = Step::Completed;
        }
        vec![]
    }

    fn on_activity_failed(&mut self, _activity_id: &str, _error: &ActivityError) -> Vec<WorkflowAction> {
        vec![]
    }

    fn is_completed(&self) -> bool {
        self.step == Step::Completed
    }

    fn result(&self) -> Option<Self::Output> {
        if self.step == Step::Completed {
            Some(())
        } else {
            None
        }
    }
}
