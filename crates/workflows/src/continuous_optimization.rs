//! Continuous optimization workflow
//!
//! A long-running singleton per facility. Every 5 minutes it runs
//! `MonitorSystemHealth`, `RebalanceWaves`, `TriggerDynamicRerouting`,
//! `PredictCapacityNeeds` in sequence, then re-arms its own timer —
//! this workflow never completes under normal operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use wms_durable::prelude::*;

pub const TICK_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousOptimizationInput {
    pub facility_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    MonitoringHealth,
    RebalancingWaves,
    TriggeringRerouting,
    PredictingCapacity,
    Waiting,
}

pub struct ContinuousOptimizationWorkflow {
    input: ContinuousOptimizationInput,
    step: Step,
    ticks_completed: u64,
}

impl ContinuousOptimizationWorkflow {
    fn activity(&self, activity_id: &str, activity_type: &str) -> WorkflowAction {
        WorkflowAction::ScheduleActivity {
            activity_id: format!("{activity_id}_{}", self.ticks_completed),
            activity_type: activity_type.into(),
            input: json!({ "facilityId": self.input.facility_id }),
            options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
        }
    }
}

impl Workflow for ContinuousOptimizationWorkflow {
    const TYPE: &'static str = "continuous_optimization";
    type Input = ContinuousOptimizationInput;
    type Output = ();

    fn new(input: Self::Input) -> Self {
        Self {
            input,
            step: Step::MonitoringHealth,
            ticks_completed: 0,
        }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![self.activity("monitor_system_health", "MonitorSystemHealth")]
    }

    fn on_activity_completed(&mut self, activity_id: &str, _result: serde_json::Value) -> Vec<WorkflowAction> {
        let prefix = activity_id.rsplit_once('_').map(|(p, _)| p).unwrap_or(activity_id);
        match (self.step, prefix) {
            (Step::MonitoringHealth, "monitor_system_health") => {
                self.step = Step::RebalancingWaves;
                vec![self.activity("rebalance_waves", "RebalanceWaves")]
            }
            (Step::RebalancingWaves, "rebalance_waves") => {
                self.step = Step::TriggeringRerouting;
                vec![self.activity("trigger_dynamic_rerouting", "TriggerDynamicRerouting")]
            }
            (Step::TriggeringRerouting, "trigger_dynamic_rerouting") => {
                self.step = Step::PredictingCapacity;
                vec![self.activity("predict_capacity_needs", "PredictCapacityNeeds")]
            }
            (Step::PredictingCapacity, "predict_capacity_needs") => {
                self.step = Step::Waiting;
                self.ticks_completed += 1;
                vec![WorkflowAction::timer("tick", TICK_INTERVAL)]
            }
            _ => vec![],
        }
    }

    fn on_activity_failed(&mut self, _activity_id: &str, _error: &ActivityError) -> Vec<WorkflowAction> {
        // Best-effort optimization pass: a failed step doesn't abort the
        // loop, it just waits for the next tick.
        self.step = Step::Waiting;
        self.ticks_completed += 1;
        vec![WorkflowAction::timer("tick", TICK_INTERVAL)]
    }

    fn on_timer_fired(&mut self, timer_id: &str) -> Vec<WorkflowAction> {
        if timer_id == "tick" && self.step == Step::Waiting {
            self.step = Step::MonitoringHealth;
            return vec![self.activity("monitor_system_health", "MonitorSystemHealth")];
        }
        vec![]
    }

    fn is_completed(&self) -> bool {
        false
    }

    fn result(&self) -> Option<Self::Output> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_cycles_through_all_four_activities() {
        let mut wf = ContinuousOptimizationWorkflow::new(ContinuousOptimizationInput { facility_id: "FAC-1".into() });
        wf.on_start();
        let a1 = wf.on_activity_completed("monitor_system_health_0", json!({}));
        assert!(matches!(&a1[0], WorkflowAction::ScheduleActivity { activity_type, .. } if activity_type == "RebalanceWaves"));
        let a2 = wf.on_activity_completed("rebalance_waves_0", json!({}));
        assert!(matches!(&a2[0], WorkflowAction::ScheduleActivity { activity_type, .. } if activity_type == "TriggerDynamicRerouting"));
        let a3 = wf.on_activity_completed("trigger_dynamic_rerouting_0", json!({}));
        assert!(matches!(&a3[0], WorkflowAction::ScheduleActivity { activity_type, .. } if activity_type == "PredictCapacityNeeds"));
        let a4 = wf.on_activity_completed("predict_capacity_needs_0", json!({}));
        assert!(matches!(&a4[0], WorkflowAction::StartTimer { timer_id, .. } if timer_id == "tick"));
        assert_eq!(wf.ticks_completed, 1);
    }

    #[test]
    fn test_never_completes() {
        let wf = ContinuousOptimizationWorkflow::new(ContinuousOptimizationInput { facility_id: "FAC-1".into() });
        assert!(!wf.is_completed());
    }
}
