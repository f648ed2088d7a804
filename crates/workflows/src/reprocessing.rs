//! Batch reprocessing workflow
//!
//! Runs on a durable schedule (default hourly). Queries eligible orders
//! page by page; for each, resets the order aggregate to a safe
//! pre-step state, starts a fresh fulfillment workflow, and increments
//! retry metadata. Duplicate scheduled runs for the same tick are
//! skipped by the scheduler's `SKIP` overlap policy — this workflow
//! assumes it is the only active run and does not re-check that itself.

use serde::{Deserialize, Serialize};
use serde_json::json;

use wms_durable::prelude::*;

const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReprocessingInput {
    pub facility_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReprocessingResult {
    pub orders_requeued: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    FetchingPage,
    Requeuing,
    Completed,
}

pub struct ReprocessingWorkflow {
    input: ReprocessingInput,
    step: Step,
    page: u32,
    orders_requeued: u32,
    /// Requeue activities still outstanding for the current page. The page
    /// only advances once every one of them has completed or failed —
    /// advancing on the first completion would drop the rest on the floor
    /// and undercount `orders_requeued`.
    outstanding_requeues: u32,
}

impl ReprocessingWorkflow {
    fn fetch_page_activity(&self) -> WorkflowAction {
        WorkflowAction::ScheduleActivity {
            activity_id: format!("fetch_eligible_page_{}", self.page),
            activity_type: "FetchEligibleOrdersPage".into(),
            input: json!({ "facilityId": self.input.facility_id, "page": self.page, "pageSize": PAGE_SIZE }),
            options: ActivityOptions::default().with_retry(RetryPolicy::standard()),
        }
    }

    /// One requeue activity for the current page just resolved (either
    /// way). Only once every requeue dispatched for this page has resolved
    /// does the scan advance to the next page.
    fn advance_past_page_if_drained(&mut self) -> Vec<WorkflowAction> {
        self.outstanding_requeues = self.outstanding_requeues.saturating_sub(1);
        if self.outstanding_requeues > 0 {
            return vec![];
        }
        self.page += 1;
        self.step = Step::FetchingPage;
        vec![self.fetch_page_activity()]
    }
}

impl Workflow for ReprocessingWorkflow {
    const TYPE: &'static str = "batch_reprocessing";
    type Input = ReprocessingInput;
    type Output = ReprocessingResult;

    fn new(input: Self::Input) -> Self {
        Self { input, step: Step::FetchingPage, page: 0, orders_requeued: 0, outstanding_requeues: 0 }
    }

    fn on_start(&mut self) -> Vec<WorkflowAction> {
        vec![self.fetch_page_activity()]
    }

    fn on_activity_completed(&mut self, activity_id: &str, result: serde_json::Value) -> Vec<WorkflowAction> {
        if self.step == Step::FetchingPage && activity_id == format!("fetch_eligible_page_{}", self.page) {
            let order_ids: Vec<String> = result["orderIds"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
                .unwrap_or_default();

            if order_ids.is_empty() {
                self.step = Step::Completed;
                return vec![];
            }

            self.step = Step::Requeuing;
            self.outstanding_requeues = order_ids.len() as u32;
            order_ids
                .into_iter()
                .map(|order_id| WorkflowAction::ScheduleActivity {
                    activity_id: format!("requeue_{order_id}"),
                    activity_type: "RequeueOrderForReprocessing".into(),
                    input: json!({ "orderId": order_id }),
                    options: ActivityOptions::default().with_retry(RetryPolicy::conservative()),
                })
                .collect()
        } else if self.step == Step::Requeuing && activity_id.starts_with("requeue_") {
            self.orders_requeued += 1;
            self.advance_past_page_if_drained()
        } else {
            vec![]
        }
    }

    fn on_activity_failed(&mut self, activity_id: &str, _error: &ActivityError) -> Vec<WorkflowAction> {
        // A single order failing to requeue doesn't stop the batch; it
        // stays eligible and will be picked up on the next scheduled run.
        if self.step == Step::Requeuing && activity_id.starts_with("requeue_") {
            return self.advance_past_page_if_drained();
        }
        self.step = Step::Completed;
        vec![]
    }

    fn is_completed(&self) -> bool {
        self.step == Step::Completed
    }

    fn result(&self) -> Option<Self::Output> {
        if self.step == Step::Completed {
            Some(ReprocessingResult { orders_requeued: self.orders_requeued })
        } else {
            None
        }
    }
}
