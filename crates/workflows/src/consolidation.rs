//! Consolidation workflow
//!
//! Spawned only for multi-item orders. Waits for a `toteArrived` signal
//! per expected tote, then a final `consolidationCompleted` signal once
//! the operator confirms the bin reconciles.

use serde::{Deserialize, Serialize};

use wms_durable::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationInput {
    pub order_id: String,
    pub expected_totes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationResult {
    pub order_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    AwaitingTotes,
    AwaitingCompletion,
    Completed,
}

pub struct ConsolidationWorkflow {
    input: ConsolidationInput,
    step: Step,
    totes_arrived: u32,
}

impl Workflow for ConsolidationWorkflow {
    const TYPE: &'static str = "consolidation";
    type Input = ConsolidationInput;
    type Output = ConsolidationResult;

    fn new(input: Self::Input) -> Self {
        Self { input, step: Step::AwaitingTotes, totes_arrived: 0 }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![]
    }

    fn on_activity_completed(&mut self, _activity_id: &str, _result: serde_json::Value) -> Vec<WorkflowAction> {
        vec![]
    }

    fn on_activity_failed(&mut self, _activity_id: &str, _error: &ActivityError) -> Vec<WorkflowAction> {
        vec![]
    }

    fn on_signal(&mut self, signal: &WorkflowSignal) -> Vec<WorkflowAction> {
        match (self.step, signal.signal_type.as_str()) {
            (Step::AwaitingTotes, "toteArrived") => {
                self.totes_arrived += 1;
                if self.totes_arrived >= self.input.expected_totes {
                    self.step = Step::AwaitingCompletion;
                }
                vec![]
            }
            (Step::AwaitingCompletion, "consolidationCompleted") => {
                self.step = Step::Completed;
                vec![]
            }
            _ => vec![],
        }
    }

    fn is_completed(&self) -> bool {
        self.step == Step::Completed
    }

    fn result(&self) -> Option<Self::Output> {
        if self.step == Step::Completed {
            Some(ConsolidationResult { order_id: self.input.order_id.clone() })
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
    fn test_requires_all_expected_totes_before_completion_signal() {
        let mut wf = ConsolidationWorkflow::new(ConsolidationInput { order_id: "ORD-1".into(), expected_totes: 2 });
        wf.on_signal(&WorkflowSignal::custom("toteArrived", json!({})));
        assert_eq!(wf.step, Step::AwaitingTotes);
        wf.on_signal(&WorkflowSignal::custom("toteArrived", json!({})));
        assert_eq!(wf.step, Step::AwaitingCompletion);
        wf.on_signal(&WorkflowSignal::custom("consolidationCompleted", json!({})));
        assert!(wf.is_completed());
    }
}
