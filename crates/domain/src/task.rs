//! Units of work attached to messages.
//!
//! A [`Task`] tracks one asynchronous step (a generation request, a
//! tool call) inside the message that owns it. All helpers are pure
//! value transformers — the original task is never mutated, callers
//! replace it with the returned copy.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Task status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Error,
}

impl TaskStatus {
    /// Completed and Error are final — no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Task
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    /// Discriminator kept in the serialized form; always `"task"`.
    #[serde(rename = "type", default = "task_type")]
    pub task_type: String,
    pub name: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn task_type() -> String {
    "task".into()
}

impl Task {
    /// New pending task with a fresh unique id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_type: task_type(),
            name: name.into(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }

    /// Copy with the status replaced; id, name, and type are preserved.
    pub fn with_status(&self, status: TaskStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Copy with a result attached and the status forced to Completed.
    pub fn completed(&self, result: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Completed,
            result: Some(result.into()),
            ..self.clone()
        }
    }

    /// Copy with an error attached and the status forced to Error.
    pub fn errored(&self, error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Error,
            error: Some(error.into()),
            ..self.clone()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
