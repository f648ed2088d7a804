//! Operator-facing dead-letter queue operations: list, and resolve with
//! one of `manual_retry` (resets the order through `wms_reprocessing`
//! and starts it on a fresh fulfillment workflow), `cancelled`, or
//! `escalated`.

use std::sync::Arc;

use wms_domain::dead_letter::{DeadLetterEntry, DeadLetterResolution};
use wms_durable::{ExecutorError, WorkflowExecutor};
use wms_reprocessing::prelude::{ReprocessingError, ReprocessingStore};
use wms_reprocessing::dead_letter_queue::{self, ResolutionError};
use wms_workflows::fulfillment::{FulfillmentInput, FulfillmentWorkflow};

use crate::storage::orchestrator_store::OrchestratorStore;
use crate::storage::{DomainStore, DomainStoreError};

#[derive(Debug, thiserror::Error)]
pub enum DeadLetterServiceError {
    #[error("storage error: {0}")]
    Storage(#[from] DomainStoreError),
    #[error("dead-letter entry not found: {0}")]
    NotFound(String),
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),
    #[error("reprocessing error: {0}")]
    Reprocessing(#[from] ReprocessingError),
    #[error("workflow error: {0}")]
    Workflow(#[from] ExecutorError),
}

pub struct DeadLetterService {
    domain_store: Arc<dyn DomainStore>,
    reprocessing_store: Arc<dyn ReprocessingStore>,
    executor: Arc<WorkflowExecutor<OrchestratorStore>>,
}

impl DeadLetterService {
    pub fn new(
        domain_store: Arc<dyn DomainStore>,
        reprocessing_store: Arc<dyn ReprocessingStore>,
        executor: Arc<WorkflowExecutor<OrchestratorStore>>,
    ) -> Self {
        Self { domain_store, reprocessing_store, executor }
    }

    pub async fn list(&self, resolution: Option<DeadLetterResolution>) -> Result<Vec<DeadLetterEntry>, DeadLetterServiceError> {
        Ok(self.domain_store.list_dead_letter_entries(resolution).await?)
    }

    pub async fn get(&self, entry_id: &str) -> Result<DeadLetterEntry, DeadLetterServiceError> {
        self.domain_store
            .get_dead_letter_entry(entry_id)
            .await?
            .ok_or_else(|| DeadLetterServiceError::NotFound(entry_id.to_string()))
    }

    pub async fn resolve(
        &self,
        entry_id: &str,
        resolution: DeadLetterResolution,
        resolved_by: impl Into<String>,
        notes: Option<String>,
    ) -> Result<DeadLetterEntry, DeadLetterServiceError> {
        let mut entry = self.get(entry_id).await?;
        let order_id = entry.order_id.clone();

        dead_letter_queue::resolve(&mut entry, resolution, resolved_by, notes)?;
        self.domain_store.save_dead_letter_entry(entry.clone()).await?;

        if resolution == DeadLetterResolution::ManualRetry {
            self.reprocessing_store.requeue_order(&order_id).await?;
            self.restart_fulfillment(&order_id).await?;
        }

        Ok(entry)
    }

    /// Starts a fresh fulfillment workflow for an order the store has just
    /// reset, and stamps the new workflow ID onto the aggregate so the
    /// signal bridge can resolve it. Mirrors `OrderIntakeService::create_order`.
    async fn restart_fulfillment(&self, order_id: &str) -> Result<(), DeadLetterServiceError> {
        let mut order = self
            .domain_store
            .get_order(order_id)
            .await?
            .ok_or_else(|| DeadLetterServiceError::OrderNotFound(order_id.to_string()))?;

        let workflow_id = self
            .executor
            .start_workflow::<FulfillmentWorkflow>(
                FulfillmentInput {
                    order_id: order.order_id.clone(),
                    priority: order.priority,
                    is_multi_item: order.is_multi_item(),
                    // Not persisted on the order aggregate; only known at
                    // intake time, so a requeued order always restarts
                    // without gift wrap.
                    requires_gift_wrap: false,
                },
                None,
            )
            .await?;

        order.workflow_id = Some(workflow_id);
        self.domain_store.save_order(order).await?;
        Ok(())
    }
}
