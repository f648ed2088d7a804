//! Packing workflow
//!
//! Optionally spawns a `GiftWrap` side task that must complete before
//! the packing seal step runs.

use serde::{Deserialize, Serialize};
use serde_json::json;

use wms_durable::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingInput {
    pub order_id: String,
    pub requires_gift_wrap: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingResult {
    pub order_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    AwaitingGiftWrap,
    Sealing,
    Completed,
}

pub struct PackingWorkflow {
    input: PackingInput,
    step: Step,
}

impl PackingWorkflow {
    fn seal_activity(&self) -> WorkflowAction {
        WorkflowAction::ScheduleActivity {
            activity_id: "seal_package".into(),
            activity_type: "SealPackage".into(),
            input: json!({ "orderId": self.input.order_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
        }
    }
}

impl Workflow for PackingWorkflow {
    const TYPE: &'static str = "packing";
    type Input = PackingInput;
    type Output = PackingResult;

    fn new(input: Self::Input) -> Self {
        let step = if input.requires_gift_wrap { Step::AwaitingGiftWrap } else { Step::Sealing };
        Self { input, step }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        if self.step == Step::Sealing {
            vec![self.seal_activity()]
        } else {
            vec![]
        }
    }

    fn on_activity_completed(&mut self, activity_id: &str, _result: serde_json::Value) -> Vec<WorkflowAction> {
        if self.step == Step::Sealing && activity_id == "seal_package" {
            self.step = Step::Completed;
        }
        vec![]
    }

    fn on_activity_failed(&mut self, _activity_id: &str, _error: &ActivityError) -> Vec<WorkflowAction> {
        vec![]
    }

    fn on_signal(&mut self, signal: &WorkflowSignal) -> Vec<WorkflowAction> {
        if self.step == Step::AwaitingGiftWrap && signal.signal_type == "giftWrapCompleted" {
            self.step = Step::Sealing;
            return vec![self.seal_activity()];
        }
        vec![]
    }

    fn is_completed(&self) -> bool {
        self.step == Step::Completed
    }

    fn result(&self) -> Option<Self::Output> {
        if self.step == Step::Completed {
            Some(PackingResult { order_id: self.input.order_id.clone() })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gift_wrap_order_waits_before_sealing() {
        let mut wf = PackingWorkflow::new(PackingInput { order_id: "ORD-1".into(), requires_gift_wrap: true });
        let actions = wf.on_start();
        assert!(actions.is_empty());
        let actions = wf.on_signal(&WorkflowSignal::custom("giftWrapCompleted", json!({})));
        assert!(matches!(&actions[0], WorkflowAction::ScheduleActivity { activity_type, .. } if activity_type == "SealPackage"));
    }

    #[test]
    fn test_no_gift_wrap_seals_immediately() {
        let mut wf = PackingWorkflow::new(PackingInput { order_id: "ORD-1".into(), requires_gift_wrap: false });
        let actions = wf.on_start();
        assert!(matches!(&actions[0], WorkflowAction::ScheduleActivity { activity_type, .. } if activity_type == "SealPackage"));
    }
}
