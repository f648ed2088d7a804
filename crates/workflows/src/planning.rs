//! Planning workflow
//!
//! `DetermineProcessPath -> FindCapableStation -> ReserveStationCapacity`,
//! then await `waveAssigned`. A station-capacity failure invokes the
//! escalation engine (see `wms_routing`) to downgrade the process path
//! before retrying station reservation.

use serde::{Deserialize, Serialize};
use serde_json::json;

use wms_durable::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningInput {
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningResult {
    pub order_id: String,
    pub station_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    DeterminingPath,
    FindingStation,
    ReservingCapacity,
    AwaitingWaveAssignment,
    Completed,
}

pub struct PlanningWorkflow {
    input: PlanningInput,
    step: Step,
    station_id: Option<String>,
    escalation_attempts: u32,
}

impl Workflow for PlanningWorkflow {
    const TYPE: &'static str = "planning";
    type Input = PlanningInput;
    type Output = PlanningResult;

    fn new(input: Self::Input) -> Self {
        Self {
            input,
            step: Step::DeterminingPath,
            station_id: None,
            escalation_attempts: 0,
        }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![WorkflowAction::ScheduleActivity {
            activity_id: "determine_process_path".into(),
            activity_type: "DetermineProcessPath".into(),
            input: json!({ "orderId": self.input.order_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
        }]
    }

    fn on_activity_completed(&mut self, activity_id: &str, result: serde_json::Value) -> Vec<WorkflowAction> {
        match (self.step, activity_id) {
            (Step::DeterminingPath, "determine_process_path") => {
                self.step = Step::FindingStation;
                vec![WorkflowAction::ScheduleActivity {
                    activity_id: "find_capable_station".into(),
                    activity_type: "FindCapableStation".into(),
                    input: json!({ "orderId": self.input.order_id }),
                    options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
                }]
            }
            (Step::FindingStation, "find_capable_station") => {
                self.station_id = result["stationId"].as_str().map(String::from);
                self.step = Step::ReservingCapacity;
                vec![WorkflowAction::ScheduleActivity {
                    activity_id: "reserve_station_capacity".into(),
                    activity_type: "ReserveStationCapacity".into(),
                    input: json!({ "orderId": self.input.order_id, "stationId": self.station_id }),
                    options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
                }]
            }
            (Step::ReservingCapacity, "reserve_station_capacity") => {
                self.step = Step::AwaitingWaveAssignment;
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_activity_failed(&mut self, activity_id: &str, error: &ActivityError) -> Vec<WorkflowAction> {
        if self.step == Step::ReservingCapacity && activity_id == "reserve_station_capacity" {
            let escalates = error
                .error_type
                .as_deref()
                .is_some_and(|t| matches!(t, "capacity_exceeded" | "certification_missing" | "equipment_unavailable"));
            if escalates {
                self.escalation_attempts += 1;
                return vec![WorkflowAction::ScheduleActivity {
                    activity_id: format!("escalate_process_path_{}", self.escalation_attempts),
                    activity_type: "EscalateProcessPath".into(),
                    input: json!({ "orderId": self.input.order_id, "reason": error.message }),
                    options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
                }];
            }
        }
        vec![WorkflowAction::fail(WorkflowError::new(format!("{activity_id} failed: {error}")))]
    }

    fn on_signal(&mut self, signal: &WorkflowSignal) -> Vec<WorkflowAction> {
        if self.step == Step::AwaitingWaveAssignment && signal.signal_type == "waveAssigned" {
            self.step = Step::Completed;
        }
        vec![]
    }

    fn is_completed(&self) -> bool {
        self.step == Step::Completed
    }

    fn result(&self) -> Option<Self::Output> {
        if self.step == Step::Completed {
            self.station_id.clone().map(|station_id| PlanningResult {
                order_id: self.input.order_id.clone(),
                station_id,
            })
        } else {
            None
        }
    }
}
