//! Enum-dispatch over the two `WorkflowEventStore` implementations, the
//! same pattern the teacher uses for its own `StorageBackend`: a single
//! concrete type the HTTP service can hold in `AppState`, backed by
//! either Postgres (production) or the in-memory store (dev mode).

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use wms_durable::{
    ClaimedTask, DlqEntry, DlqFilter, HeartbeatResponse, InMemoryWorkflowEventStore, Pagination,
    PostgresWorkflowEventStore, StoreError, TaskDefinition, TaskFailureOutcome, TraceContext,
    WorkerFilter, WorkerInfo, WorkflowEvent, WorkflowEventStore, WorkflowInfo, WorkflowSignal,
    WorkflowStatus,
};

#[derive(Clone)]
pub enum OrchestratorStore {
    Postgres(PostgresWorkflowEventStore),
    InMemory(std::sync::Arc<InMemoryWorkflowEventStore>),
}

impl OrchestratorStore {
    pub fn postgres(pool: PgPool) -> Self {
        Self::Postgres(PostgresWorkflowEventStore::new(pool))
    }

    pub fn in_memory() -> Self {
        Self::InMemory(std::sync::Arc::new(InMemoryWorkflowEventStore::new()))
    }
}

#[async_trait]
impl WorkflowEventStore for OrchestratorStore {
    async fn create_workflow(
        &self,
        workflow_id: Uuid,
        workflow_type: &str,
        input: serde_json::Value,
        trace_context: Option<&TraceContext>,
    ) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.create_workflow(workflow_id, workflow_type, input, trace_context).await,
            Self::InMemory(s) => s.create_workflow(workflow_id, workflow_type, input, trace_context).await,
        }
    }

    async fn get_workflow_status(&self, workflow_id: Uuid) -> Result<WorkflowStatus, StoreError> {
        match self {
            Self::Postgres(s) => s.get_workflow_status(workflow_id).await,
            Self::InMemory(s) => s.get_workflow_status(workflow_id).await,
        }
    }

    async fn get_workflow_info(&self, workflow_id: Uuid) -> Result<WorkflowInfo, StoreError> {
        match self {
            Self::Postgres(s) => s.get_workflow_info(workflow_id).await,
            Self::InMemory(s) => s.get_workflow_info(workflow_id).await,
        }
    }

    async fn append_events(
        &self,
        workflow_id: Uuid,
        expected_sequence: i32,
        events: Vec<WorkflowEvent>,
    ) -> Result<i32, StoreError> {
        match self {
            Self::Postgres(s) => s.append_events(workflow_id, expected_sequence, events).await,
            Self::InMemory(s) => s.append_events(workflow_id, expected_sequence, events).await,
        }
    }

    async fn load_events(&self, workflow_id: Uuid) -> Result<Vec<(i32, WorkflowEvent)>, StoreError> {
        match self {
            Self::Postgres(s) => s.load_events(workflow_id).await,
            Self::InMemory(s) => s.load_events(workflow_id).await,
        }
    }

    async fn update_workflow_status(
        &self,
        workflow_id: Uuid,
        status: WorkflowStatus,
        result: Option<serde_json::Value>,
        error: Option<wms_durable::WorkflowError>,
    ) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.update_workflow_status(workflow_id, status, result, error).await,
            Self::InMemory(s) => s.update_workflow_status(workflow_id, status, result, error).await,
        }
    }

    async fn enqueue_task(&self, task: TaskDefinition) -> Result<Uuid, StoreError> {
        match self {
            Self::Postgres(s) => s.enqueue_task(task).await,
            Self::InMemory(s) => s.enqueue_task(task).await,
        }
    }

    async fn claim_task(
        &self,
        worker_id: &str,
        activity_types: &[String],
        max_tasks: usize,
    ) -> Result<Vec<ClaimedTask>, StoreError> {
        match self {
            Self::Postgres(s) => s.claim_task(worker_id, activity_types, max_tasks).await,
            Self::InMemory(s) => s.claim_task(worker_id, activity_types, max_tasks).await,
        }
    }

    async fn heartbeat_task(
        &self,
        task_id: Uuid,
        worker_id: &str,
        details: Option<serde_json::Value>,
    ) -> Result<HeartbeatResponse, StoreError> {
        match self {
            Self::Postgres(s) => s.heartbeat_task(task_id, worker_id, details).await,
            Self::InMemory(s) => s.heartbeat_task(task_id, worker_id, details).await,
        }
    }

    async fn complete_task(&self, task_id: Uuid, result: serde_json::Value) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.complete_task(task_id, result).await,
            Self::InMemory(s) => s.complete_task(task_id, result).await,
        }
    }

    async fn fail_task(&self, task_id: Uuid, error: &str) -> Result<TaskFailureOutcome, StoreError> {
        match self {
            Self::Postgres(s) => s.fail_task(task_id, error).await,
            Self::InMemory(s) => s.fail_task(task_id, error).await,
        }
    }

    async fn reclaim_stale_tasks(&self, stale_threshold: Duration) -> Result<Vec<Uuid>, StoreError> {
        match self {
            Self::Postgres(s) => s.reclaim_stale_tasks(stale_threshold).await,
            Self::InMemory(s) => s.reclaim_stale_tasks(stale_threshold).await,
        }
    }

    async fn send_signal(&self, workflow_id: Uuid, signal: WorkflowSignal) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.send_signal(workflow_id, signal).await,
            Self::InMemory(s) => s.send_signal(workflow_id, signal).await,
        }
    }

    async fn get_pending_signals(&self, workflow_id: Uuid) -> Result<Vec<WorkflowSignal>, StoreError> {
        match self {
            Self::Postgres(s) => s.get_pending_signals(workflow_id).await,
            Self::InMemory(s) => s.get_pending_signals(workflow_id).await,
        }
    }

    async fn mark_signals_processed(&self, workflow_id: Uuid, count: usize) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.mark_signals_processed(workflow_id, count).await,
            Self::InMemory(s) => s.mark_signals_processed(workflow_id, count).await,
        }
    }

    async fn register_worker(&self, worker: WorkerInfo) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.register_worker(worker).await,
            Self::InMemory(s) => s.register_worker(worker).await,
        }
    }

    async fn worker_heartbeat(
        &self,
        worker_id: &str,
        current_load: usize,
        accepting_tasks: bool,
    ) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.worker_heartbeat(worker_id, current_load, accepting_tasks).await,
            Self::InMemory(s) => s.worker_heartbeat(worker_id, current_load, accepting_tasks).await,
        }
    }

    async fn list_workers(&self, filter: WorkerFilter) -> Result<Vec<WorkerInfo>, StoreError> {
        match self {
            Self::Postgres(s) => s.list_workers(filter).await,
            Self::InMemory(s) => s.list_workers(filter).await,
        }
    }

    async fn deregister_worker(&self, worker_id: &str) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.deregister_worker(worker_id).await,
            Self::InMemory(s) => s.deregister_worker(worker_id).await,
        }
    }

    async fn move_to_dlq(&self, task_id: Uuid, error_history: Vec<String>) -> Result<(), StoreError> {
        match self {
            Self::Postgres(s) => s.move_to_dlq(task_id, error_history).await,
            Self::InMemory(s) => s.move_to_dlq(task_id, error_history).await,
        }
    }

    async fn requeue_from_dlq(&self, dlq_id: Uuid) -> Result<Uuid, StoreError> {
        match self {
            Self::Postgres(s) => s.requeue_from_dlq(dlq_id).await,
            Self::InMemory(s) => s.requeue_from_dlq(dlq_id).await,
        }
    }

    async fn list_dlq(&self, filter: DlqFilter, pagination: Pagination) -> Result<Vec<DlqEntry>, StoreError> {
        match self {
            Self::Postgres(s) => s.list_dlq(filter, pagination).await,
            Self::InMemory(s) => s.list_dlq(filter, pagination).await,
        }
    }
}
