//! Translates external HTTP completions (from WES, WMS, carrier
//! integrations) into workflow signals.
//!
//! Resolution: derive the order ID from the request body, look up the
//! order, and signal its workflow UUID. If the order isn't found under
//! that ID, retry once against the secondary `wes-{orderId}` convention
//! by stripping the prefix and re-resolving — the single fallback the
//! contract allows before giving up.

use std::sync::Arc;

use serde_json::Value;

use wms_durable::{ExecutorError, WorkflowExecutor, WorkflowSignal};

use crate::storage::orchestrator_store::OrchestratorStore;
use crate::storage::DomainStore;

/// Signal names accepted at `POST /api/v1/signals/{signalName}`, mapped
/// to the workflow-internal signal type and whether a miss is
/// shipment-scoped (ack-only) or order-scoped (hard failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    WaveAssigned,
    PickCompleted,
    ToteArrived,
    ConsolidationCompleted,
    GiftWrapCompleted,
    WallingCompleted,
    PackingCompleted,
    ReceivingCompleted,
    StowCompleted,
}

impl SignalKind {
    pub fn from_path_name(name: &str) -> Option<Self> {
        Some(match name {
            "wave-assigned" => Self::WaveAssigned,
            "pick-completed" => Self::PickCompleted,
            "tote-arrived" => Self::ToteArrived,
            "consolidation-completed" => Self::ConsolidationCompleted,
            "gift-wrap-completed" => Self::GiftWrapCompleted,
            "walling-completed" => Self::WallingCompleted,
            "packing-completed" => Self::PackingCompleted,
            "receiving-completed" => Self::ReceivingCompleted,
            "stow-completed" => Self::StowCompleted,
            _ => return None,
        })
    }

    /// The signal type the workflows' `on_signal` match arms expect.
    pub fn signal_type(self) -> &'static str {
        match self {
            Self::WaveAssigned => "waveAssigned",
            Self::PickCompleted => "pickCompleted",
            Self::ToteArrived => "toteArrived",
            Self::ConsolidationCompleted => "consolidationCompleted",
            Self::GiftWrapCompleted => "giftWrapCompleted",
            Self::WallingCompleted => "wallingCompleted",
            Self::PackingCompleted => "packingCompleted",
            Self::ReceivingCompleted => "receivingCompleted",
            Self::StowCompleted => "stowCompleted",
        }
    }

    /// Order-scoped signals fail loudly when the workflow can't be
    /// found; shipment-scoped signals (everything downstream of wave
    /// assignment) just acknowledge, since the shipment may have
    /// already completed its workflow by the time a late signal lands.
    pub fn is_order_scoped(self) -> bool {
        matches!(self, Self::WaveAssigned | Self::PickCompleted)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SignalBridgeError {
    #[error("unknown signal name: {0}")]
    UnknownSignal(String),
    #[error("workflow not found for order {0}")]
    WorkflowNotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::DomainStoreError),
    #[error("workflow error: {0}")]
    Workflow(#[from] ExecutorError),
}

pub enum SignalOutcome {
    Delivered { workflow_id: uuid::Uuid },
    AckOnly,
}

pub struct SignalBridgeService {
    domain_store: Arc<dyn DomainStore>,
    executor: Arc<WorkflowExecutor<OrchestratorStore>>,
}

impl SignalBridgeService {
    pub fn new(domain_store: Arc<dyn DomainStore>, executor: Arc<WorkflowExecutor<OrchestratorStore>>) -> Self {
        Self { domain_store, executor }
    }

    pub async fn dispatch(
        &self,
        signal_name: &str,
        order_id: &str,
        payload: Value,
    ) -> Result<SignalOutcome, SignalBridgeError> {
        let kind = SignalKind::from_path_name(signal_name)
            .ok_or_else(|| SignalBridgeError::UnknownSignal(signal_name.to_string()))?;

        let resolved = match self.domain_store.get_order(order_id).await? {
            Some(order) => Some(order),
            None => {
                let fallback_id = order_id.strip_prefix("wes-").unwrap_or(order_id);
                self.domain_store.get_order(fallback_id).await?
            }
        };

        let Some(workflow_id) = resolved.and_then(|o| o.workflow_id) else {
            return if kind.is_order_scoped() {
                Err(SignalBridgeError::WorkflowNotFound(order_id.to_string()))
            } else {
                Ok(SignalOutcome::AckOnly)
            };
        };

        let signal = WorkflowSignal::custom(kind.signal_type(), payload);
        self.executor.send_signal(workflow_id, signal).await?;

        Ok(SignalOutcome::Delivered { workflow_id })
    }
}
