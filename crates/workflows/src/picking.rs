//! Picking workflow
//!
//! Spawned once per route calculated by the fulfillment workflow. Waits
//! for the `pickCompleted` signal, with a per-priority timeout mirroring
//! the parent's wave-assignment schedule.

use serde::{Deserialize, Serialize};

use wms_domain::order::OrderPriority;
use wms_durable::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickingInput {
    pub order_id: String,
    pub route_id: String,
    pub priority: OrderPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickingResult {
    pub order_id: String,
    pub route_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    AwaitingPick,
    Completed,
    TimedOut,
}

pub struct PickingWorkflow {
    input: PickingInput,
    step: Step,
}

impl Workflow for PickingWorkflow {
    const TYPE: &'static str = "picking";
    type Input = PickingInput;
    type Output = PickingResult;

    fn new(input: Self::Input) -> Self {
        Self { input, step: Step::AwaitingPick }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![WorkflowAction::timer("pick_timeout", self.input.priority.pick_completion_timeout())]
    }

    fn on_activity_completed(&mut self, _activity_id: &str, _result: serde_json::Value) -> Vec<WorkflowAction> {
        vec![]
    }

    fn on_activity_failed(&mut self, _activity_id: &str, _error: &ActivityError) -> Vec<WorkflowAction> {
        vec![]
    }

    fn on_timer_fired(&mut self, timer_id: &str) -> Vec<WorkflowAction> {
        if timer_id == "pick_timeout" && self.step == Step::AwaitingPick {
            self.step = Step::TimedOut;
        }
        vec![]
    }

    fn on_signal(&mut self, signal: &WorkflowSignal) -> Vec<WorkflowAction> {
        if self.step == Step::AwaitingPick && signal.signal_type == "pickCompleted" {
            self.step = Step::Completed;
        }
        vec![]
    }

    fn is_completed(&self) -> bool {
        matches!(self.step, Step::Completed | Step::TimedOut)
    }

    fn result(&self) -> Option<Self::Output> {
        if self.step == Step::Completed {
            Some(PickingResult {
                order_id: self.input.order_id.clone(),
                route_id: self.input.route_id.clone(),
            })
        } else {
            None
        }
    }

    fn error(&self) -> Option<WorkflowError> {
        if self.step == Step::TimedOut {
            Some(WorkflowError::new("pick_timeout").with_code("pick_timeout"))
        } else {
            None
        }
    }
}
