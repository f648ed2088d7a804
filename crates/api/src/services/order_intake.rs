//! Order intake: persist the aggregate, start its fulfillment workflow,
//! and record the workflow ID back onto the order so the signal bridge
//! can resolve it later.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use wms_domain::order::{LineItem, Order, OrderPriority, ShipAddress};
use wms_domain::tenancy::TenancyContext;
use wms_durable::{ExecutorError, WorkflowExecutor};
use wms_workflows::fulfillment::FulfillmentWorkflow;

use crate::storage::orchestrator_store::OrchestratorStore;
use crate::storage::{DomainStore, DomainStoreError};

#[derive(Debug, thiserror::Error)]
pub enum OrderIntakeError {
    #[error("storage error: {0}")]
    Storage(#[from] DomainStoreError),
    #[error("workflow error: {0}")]
    Workflow(#[from] ExecutorError),
}

pub struct OrderIntakeService {
    domain_store: Arc<dyn DomainStore>,
    executor: Arc<WorkflowExecutor<OrchestratorStore>>,
}

impl OrderIntakeService {
    pub fn new(domain_store: Arc<dyn DomainStore>, executor: Arc<WorkflowExecutor<OrchestratorStore>>) -> Self {
        Self { domain_store, executor }
    }

    pub async fn create_order(
        &self,
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        line_items: Vec<LineItem>,
        ship_address: ShipAddress,
        priority: OrderPriority,
        promised_delivery_at: DateTime<Utc>,
        requires_gift_wrap: bool,
        tenancy: TenancyContext,
    ) -> Result<Order, OrderIntakeError> {
        let mut order = Order::new(
            order_id,
            customer_id,
            line_items,
            ship_address,
            priority,
            promised_delivery_at,
            tenancy,
        );

        let workflow_id = self
            .executor
            .start_workflow::<FulfillmentWorkflow>(
                wms_workflows::fulfillment::FulfillmentInput {
                    order_id: order.order_id.clone(),
                    priority: order.priority,
                    is_multi_item: order.is_multi_item(),
                    requires_gift_wrap,
                },
                None,
            )
            .await?;

        order.workflow_id = Some(workflow_id);
        self.domain_store.create_order(order.clone()).await?;

        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Option<Order>, OrderIntakeError> {
        Ok(self.domain_store.get_order(order_id).await?)
    }

    pub async fn list_orders_by_status(
        &self,
        status: wms_domain::order::OrderStatus,
        limit: i64,
    ) -> Result<Vec<Order>, OrderIntakeError> {
        Ok(self.domain_store.list_orders_by_status(status, limit).await?)
    }
}

/// Workflow ID Uuid is unrelated in format to the order's own
/// convention name — `fulfillment_workflow_id` documents the
/// human-facing convention (`order-fulfillment-{orderId}`); the
/// durable executor itself keys workflows by UUID, so the order
/// aggregate's `workflow_id` field is the authoritative link between
/// the two, used by the signal bridge to resolve a running workflow.
pub fn workflow_uuid_for_order(order: &Order) -> Option<Uuid> {
    order.workflow_id
}
