//! Shipping workflow
//!
//! Performs SLAM (scan / label / apply / manifest) and marks the order
//! shipped. The tracking number produced by `ManifestShipment` flows
//! back to the parent fulfillment workflow as this workflow's result.

use serde::{Deserialize, Serialize};
use serde_json::json;

use wms_durable::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingInput {
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingResult {
    pub order_id: String,
    pub tracking_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Scanning,
    Labeling,
    Applying,
    Manifesting,
    Completed,
}

pub struct ShippingWorkflow {
    input: ShippingInput,
    step: Step,
    tracking_number: Option<String>,
}

impl ShippingWorkflow {
    fn activity(&self, activity_id: &str, activity_type: &str) -> WorkflowAction {
        WorkflowAction::ScheduleActivity {
            activity_id: activity_id.into(),
            activity_type: activity_type.into(),
            input: json!({ "orderId": self.input.order_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
        }
    }
}

impl Workflow for ShippingWorkflow {
    const TYPE: &'static str = "shipping";
    type Input = ShippingInput;
    type Output = ShippingResult;

    fn new(input: Self::Input) -> Self {
        Self { input, step: Step::Scanning, tracking_number: None }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![self.activity("scan_package", "ScanPackage")]
    }

    fn on_activity_completed(&mut self, activity_id: &str, result: serde_json::Value) -> Vec<WorkflowAction> {
        match (self.step, activity_id) {
            (Step::Scanning, "scan_package") => {
                self.step = Step::Labeling;
                vec![self.activity("generate_label", "GenerateLabel")]
            }
            (Step::Labeling, "generate_label") => {
                self.step = Step::Applying;
                vec![self.activity("apply_label", "ApplyLabel")]
            }
            (Step::Applying, "apply_label") => {
                self.step = Step::Manifesting;
                vec![self.activity("manifest_shipment", "ManifestShipment")]
            }
            (Step::Manifesting, "manifest_shipment") => {
                self.tracking_number = result["trackingNumber"].as_str().map(String::from);
                self.step = Step::Completed;
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_activity_failed(&mut self, activity_id: &str, error: &ActivityError) -> Vec<WorkflowAction> {
        vec![WorkflowAction::fail(WorkflowError::new(format!("{activity_id} failed: {error}")))]
    }

    fn is_completed(&self) -> bool {
        self.step == Step::Completed
    }

    fn result(&self) -> Option<Self::Output> {
        self.tracking_number.clone().map(|tracking_number| ShippingResult {
            order_id: self.input.order_id.clone(),
            tracking_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slam_sequence_completes_with_tracking_number() {
        let mut wf = ShippingWorkflow::new(ShippingInput { order_id: "ORD-1".into() });
        wf.on_start();
        wf.on_activity_completed("scan_package", json!({}));
        wf.on_activity_completed("generate_label", json!({}));
        wf.on_activity_completed("apply_label", json!({}));
        wf.on_activity_completed("manifest_shipment", json!({ "trackingNumber": "1Z999" }));
        assert!(wf.is_completed());
        assert_eq!(wf.result().unwrap().tracking_number, "1Z999");
    }
}
