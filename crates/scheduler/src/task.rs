use nimbus_types::ProviderId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Inference,
    Chat,
    Embedding,
    Training,
    Mining,
}

/// Task lifecycle:
///
/// ```text
/// Pending --assign--> Assigned --start--> Processing --ok--> Completed
///                                                  `--err--> Failed
/// ```
///
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Assigned,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub task_type: TaskType,
    pub model: String,
    pub input: Vec<u8>,
    pub output: Option<Vec<u8>>,
    pub status: TaskStatus,
    pub assigned_to: Option<ProviderId>,
    pub fee: u128,
    pub created_at: u64,
    pub started_at: Option<u64>,
    pub completed_at: Option<u64>,
    pub compute_time_ms: Option<u64>,
    pub proof: Option<Vec<u8>>,
    pub error: Option<String>,
}

impl Task {
    pub fn new_pending(id: String, task_type: TaskType, model: String, input: Vec<u8>, fee: u128, now: u64) -> Self {
        Task {
            id,
            task_type,
            model,
            input,
            output: None,
            status: TaskStatus::Pending,
            assigned_to: None,
            fee,
            created_at: now,
            started_at: None,
            completed_at: None,
            compute_time_ms: None,
            proof: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_completed_and_failed() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Assigned.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
    }
}
