use std::collections::HashMap;
use std::sync::Arc;

use nimbus_attestation::Verifier;
use nimbus_ledger::{per_receipt_reward, ModelingLevel, Receipt, RewardLedger};
use nimbus_metrics::SCHEDULER_METRICS;
use nimbus_registry::{Provider, ProviderRegistry};
use nimbus_tier::CCTier;
use nimbus_types::{CoreError, Hash32, ProviderId, TaskId};
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};

use crate::assignment::pick_provider;
use crate::task::{Task, TaskStatus, TaskType};

/// Default heartbeat staleness threshold before a provider is treated as
/// offline for assignment purposes.
pub const DEFAULT_MAX_HEARTBEAT_AGE_SECS: u64 = 30;

/// Upper bound on how long a task may sit in `Processing` before the
/// scheduler reclaims it: `min(5 * provider.avg_latency, 5 minutes)`.
pub const MAX_PROCESSING_TIMEOUT_SECS: u64 = 5 * 60;

fn processing_timeout_secs(avg_latency_ms: f64) -> u64 {
    let scaled = ((5.0 * avg_latency_ms) / 1000.0).round() as u64;
    scaled.min(MAX_PROCESSING_TIMEOUT_SECS).max(1)
}

/// Combined registry + task table + model catalog, held behind a single
/// reader-writer lock per the scheduler's concurrency contract.
struct SchedulerState {
    registry: ProviderRegistry,
    tasks: HashMap<TaskId, Task>,
    model_catalog: Vec<String>,
}

/// Queued work handed from `submit_task` to the assignment loop. The channel
/// is bounded and non-blocking: when it is full the task simply stays
/// `Pending` in the table and is picked up on the next tick.
struct WorkItem {
    task_id: TaskId,
}

pub struct Scheduler {
    state: Arc<RwLock<SchedulerState>>,
    verifier: Arc<Verifier>,
    ledger: Arc<RewardLedger>,
    work_tx: mpsc::Sender<WorkItem>,
    work_rx: std::sync::Mutex<Option<mpsc::Receiver<WorkItem>>>,
}

impl Scheduler {
    pub fn new(verifier: Arc<Verifier>, ledger: Arc<RewardLedger>, model_catalog: Vec<String>, channel_capacity: usize) -> Self {
        let (work_tx, work_rx) = mpsc::channel(channel_capacity);
        Scheduler {
            state: Arc::new(RwLock::new(SchedulerState {
                registry: ProviderRegistry::new(),
                tasks: HashMap::new(),
                model_catalog,
            })),
            verifier,
            ledger,
            work_tx,
            work_rx: std::sync::Mutex::new(Some(work_rx)),
        }
    }

    pub async fn register_provider(&self, provider: Provider) -> Result<(), CoreError> {
        let mut state = self.state.write().await;
        state.registry.register(&self.verifier, provider)
    }

    pub async fn heartbeat(&self, id: &ProviderId, now: u64) {
        let mut state = self.state.write().await;
        state.registry.heartbeat(id, now);
    }

    /// Admits a new task: validates the model is in the catalog, inserts it
    /// `Pending`, and enqueues it for assignment. A full work channel is not
    /// an error; the task remains in the table for the next tick.
    pub async fn submit_task(&self, task: Task) -> Result<TaskId, CoreError> {
        if task.id.is_empty() {
            return Err(CoreError::InvalidTask("task id must not be empty".to_string()));
        }
        let mut state = self.state.write().await;
        if !state.model_catalog.is_empty() && !state.model_catalog.contains(&task.model) {
            return Err(CoreError::InvalidTask(format!(
                "model {} is not in the catalog",
                task.model
            )));
        }
        let task_id = TaskId::new(task.id.clone());
        state.tasks.insert(task_id.clone(), task);
        drop(state);

        SCHEDULER_METRICS.tasks_submitted.inc();
        SCHEDULER_METRICS.pending_tasks.inc();

        if self
            .work_tx
            .try_send(WorkItem {
                task_id: task_id.clone(),
            })
            .is_err()
        {
            warn!(task_id = %task_id, "work channel full, task stays pending for next tick");
        }
        Ok(task_id)
    }

    pub async fn task(&self, id: &TaskId) -> Option<Task> {
        self.state.read().await.tasks.get(id).cloned()
    }

    /// Attempts to assign every `Pending` task to a provider. Safe to call
    /// repeatedly; tasks that find no eligible provider stay `Pending`.
    pub async fn assign_pending(&self, now: u64) {
        let mut state = self.state.write().await;
        let pending_ids: Vec<TaskId> = state
            .tasks
            .iter()
            .filter(|(_, t)| t.status == TaskStatus::Pending)
            .map(|(id, _)| id.clone())
            .collect();

        for task_id in pending_ids {
            let picked = pick_provider(&state.registry, DEFAULT_MAX_HEARTBEAT_AGE_SECS, now);
            let Some(provider_id) = picked else {
                continue;
            };
            if state.registry.increment_current(&provider_id).is_err() {
                continue;
            }
            if let Some(task) = state.tasks.get_mut(&task_id) {
                task.status = TaskStatus::Assigned;
                task.assigned_to = Some(provider_id.clone());
                task.started_at = Some(now);
                SCHEDULER_METRICS.pending_tasks.dec();
                info!(task_id = %task_id, provider_id = %provider_id, "task assigned");
            }
        }
    }

    pub async fn mark_processing(&self, task_id: &TaskId) -> Result<(), CoreError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| CoreError::TaskNotFound(task_id.to_string()))?;
        if task.status != TaskStatus::Assigned {
            return Err(CoreError::InvalidTask(format!(
                "task {task_id} is not Assigned"
            )));
        }
        task.status = TaskStatus::Processing;
        Ok(())
    }

    /// Records a completed task: marks it `Completed`, frees the provider's
    /// concurrency slot, builds a `Receipt`, submits it to the reward
    /// ledger, and records job completion against the device table.
    #[allow(clippy::too_many_arguments)]
    pub async fn submit_result(
        &self,
        task_id: &TaskId,
        output: Vec<u8>,
        compute_time_ms: u64,
        proof: Vec<u8>,
        base_rate_wei_per_ms: u128,
        tier: CCTier,
        level: ModelingLevel,
        now: u64,
    ) -> Result<(), CoreError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| CoreError::TaskNotFound(task_id.to_string()))?;
        if task.status.is_terminal() {
            return Err(CoreError::InvalidTask(format!(
                "task {task_id} already terminal"
            )));
        }
        let provider_id = task
            .assigned_to
            .clone()
            .ok_or_else(|| CoreError::InvalidTask(format!("task {task_id} was never assigned")))?;

        task.status = TaskStatus::Completed;
        task.output = Some(output.clone());
        task.compute_time_ms = Some(compute_time_ms);
        task.proof = Some(proof.clone());
        task.completed_at = Some(now);

        state.registry.decrement_current(&provider_id);
        if let Some(provider) = state.registry.get_mut(&provider_id) {
            provider.tasks_handled += 1;
            provider.status.record_latency(compute_time_ms as f64);
        }
        drop(state);

        let receipt = Receipt {
            job_id: task_id.clone(),
            provider_id: provider_id.clone(),
            model_hash: Hash32::digest(task_id.as_str().as_bytes()),
            input_hash: Hash32::digest(&output),
            output_hash: Hash32::digest(&output),
            compute_time_ms,
            timestamp: now,
            proof,
        };
        let reward = per_receipt_reward(base_rate_wei_per_ms, compute_time_ms, tier, level);
        info!(task_id = %task_id, provider_id = %provider_id, reward = %reward, "task completed");
        self.ledger.submit_receipt(receipt, base_rate_wei_per_ms, tier, level)?;
        SCHEDULER_METRICS.tasks_completed.inc();
        Ok(())
    }

    pub async fn mark_failed(&self, task_id: &TaskId, reason: String, now: u64) -> Result<(), CoreError> {
        let mut state = self.state.write().await;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| CoreError::TaskNotFound(task_id.to_string()))?;
        if task.status.is_terminal() {
            return Err(CoreError::InvalidTask(format!(
                "task {task_id} already terminal"
            )));
        }
        let provider_id = task.assigned_to.clone();
        task.status = TaskStatus::Failed;
        task.error = Some(reason);
        task.completed_at = Some(now);

        if let Some(provider_id) = provider_id {
            state.registry.decrement_current(&provider_id);
            if let Some(provider) = state.registry.get_mut(&provider_id) {
                provider.status.record_failure();
            }
        }
        SCHEDULER_METRICS.tasks_failed.inc();
        Ok(())
    }

    /// Sweeps `Processing` tasks whose elapsed time exceeds the assigned
    /// provider's timeout and reclaims them back to `Pending` for
    /// reassignment on the next tick.
    pub async fn reclaim_timed_out(&self, now: u64) {
        let mut state = self.state.write().await;
        let stuck_ids: Vec<TaskId> = state
            .tasks
            .iter()
            .filter(|(_, t)| t.status == TaskStatus::Processing || t.status == TaskStatus::Assigned)
            .filter_map(|(id, t)| {
                let started = t.started_at?;
                let avg_latency = t
                    .assigned_to
                    .as_ref()
                    .and_then(|p| state.registry.get(p))
                    .map(|p| p.status.avg_latency_ms())
                    .unwrap_or(0.0);
                let timeout = processing_timeout_secs(avg_latency);
                if now.saturating_sub(started) > timeout {
                    Some(id.clone())
                } else {
                    None
                }
            })
            .collect();

        for task_id in stuck_ids {
            let provider_id = if let Some(task) = state.tasks.get_mut(&task_id) {
                let provider_id = task.assigned_to.take();
                task.status = TaskStatus::Pending;
                task.started_at = None;
                provider_id
            } else {
                continue;
            };
            if let Some(provider_id) = provider_id {
                state.registry.decrement_current(&provider_id);
            }
            SCHEDULER_METRICS.tasks_reclaimed.inc();
            SCHEDULER_METRICS.pending_tasks.inc();
            warn!(task_id = %task_id, "task reclaimed after timeout");
        }
    }

    /// Runs one scheduling tick: reclaim timed-out work, then assign
    /// whatever is pending. Intended to be called from a periodic loop
    /// (default interval 5s); idempotent, safe to call concurrently with
    /// `submit_task`/`submit_result`.
    pub async fn tick(&self, now: u64) {
        self.reclaim_timed_out(now).await;
        self.assign_pending(now).await;
    }

    /// Drains the work channel (used by the background poll task). Returns
    /// `None` once the channel is closed, signalling shutdown.
    pub async fn recv_work(&self) -> Option<TaskId> {
        let mut guard = self.work_rx.lock().unwrap();
        let rx = guard.as_mut()?;
        rx.recv().await.map(|item| item.task_id)
    }

    /// Idempotent shutdown: closes the work channel so `recv_work` drains
    /// and returns `None`. Safe to call more than once.
    pub fn shutdown(&self) {
        let mut guard = self.work_rx.lock().unwrap();
        *guard = None;
    }

    pub async fn task_type_counts(&self) -> HashMap<TaskType, usize> {
        let state = self.state.read().await;
        let mut counts = HashMap::new();
        for task in state.tasks.values() {
            *counts.entry(task.task_type).or_insert(0) += 1;
        }
        counts
    }

    pub async fn model_catalog(&self) -> Vec<String> {
        self.state.read().await.model_catalog.clone()
    }

    pub async fn all_tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.values().cloned().collect()
    }

    pub async fn pending_tasks(&self) -> Vec<Task> {
        self.state
            .read()
            .await
            .tasks
            .values()
            .filter(|t| t.status == TaskStatus::Pending)
            .cloned()
            .collect()
    }

    pub async fn providers(&self) -> Vec<Provider> {
        self.state.read().await.registry.iter().cloned().collect()
    }

    pub async fn provider_count(&self) -> usize {
        self.state.read().await.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_tier::CCTier;

    fn scheduler() -> Scheduler {
        Scheduler::new(
            Arc::new(Verifier::new()),
            Arc::new(RewardLedger::new()),
            vec!["llama-70b".to_string()],
            16,
        )
    }

    async fn register(scheduler: &Scheduler, id: &str, now: u64) {
        let provider = Provider::new(
            ProviderId::new(id),
            "0xabc".into(),
            format!("http://{id}"),
            vec![],
            CCTier::Tier4,
            1_000,
            now,
        );
        scheduler.register_provider(provider).await.unwrap();
    }

    fn task(id: &str, model: &str) -> Task {
        Task::new_pending(id.to_string(), TaskType::Inference, model.to_string(), vec![1, 2, 3], 10, 0)
    }

    #[tokio::test]
    async fn submit_task_rejects_unknown_model() {
        let scheduler = scheduler();
        let err = scheduler.submit_task(task("t1", "not-in-catalog")).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidTask(_)));
    }

    #[tokio::test]
    async fn submit_task_rejects_empty_id() {
        let scheduler = scheduler();
        let err = scheduler.submit_task(task("", "llama-70b")).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidTask(_)));
    }

    #[tokio::test]
    async fn full_lifecycle_assigns_completes_and_pays() {
        let scheduler = scheduler();
        register(&scheduler, "p1", 0).await;

        let task_id = scheduler.submit_task(task("t1", "llama-70b")).await.unwrap();
        scheduler.assign_pending(0).await;
        let t = scheduler.task(&task_id).await.unwrap();
        assert_eq!(t.status, TaskStatus::Assigned);
        assert_eq!(t.assigned_to, Some(ProviderId::new("p1")));

        scheduler.mark_processing(&task_id).await.unwrap();
        scheduler
            .submit_result(&task_id, vec![9, 9], 500, vec![], 1, CCTier::Tier4, ModelingLevel::Standard, 1)
            .await
            .unwrap();

        let t = scheduler.task(&task_id).await.unwrap();
        assert_eq!(t.status, TaskStatus::Completed);

        let account = scheduler.ledger.account(&ProviderId::new("p1")).unwrap();
        assert!(account.pending_rewards > num_bigint::BigUint::from(0u32));
    }

    #[tokio::test]
    async fn timed_out_task_is_reclaimed_to_pending() {
        let scheduler = scheduler();
        register(&scheduler, "p1", 0).await;
        let task_id = scheduler.submit_task(task("t1", "llama-70b")).await.unwrap();
        scheduler.assign_pending(0).await;

        scheduler.reclaim_timed_out(10_000).await;
        let t = scheduler.task(&task_id).await.unwrap();
        assert_eq!(t.status, TaskStatus::Pending);
        assert!(t.assigned_to.is_none());
    }

    #[tokio::test]
    async fn mark_failed_frees_provider_capacity() {
        let scheduler = scheduler();
        register(&scheduler, "p1", 0).await;
        let task_id = scheduler.submit_task(task("t1", "llama-70b")).await.unwrap();
        scheduler.assign_pending(0).await;

        scheduler.mark_failed(&task_id, "boom".to_string(), 1).await.unwrap();
        let t = scheduler.task(&task_id).await.unwrap();
        assert_eq!(t.status, TaskStatus::Failed);

        let state = scheduler.state.read().await;
        let provider = state.registry.get(&ProviderId::new("p1")).unwrap();
        assert_eq!(provider.status.current_tasks, 0);
    }

    #[test]
    fn processing_timeout_is_capped_at_five_minutes() {
        assert_eq!(processing_timeout_secs(10_000_000.0), MAX_PROCESSING_TIMEOUT_SECS);
        assert_eq!(processing_timeout_secs(1000.0), 5);
    }
}
