//! Browser-automation task tracking.
//!
//! Thin typed wrappers over the `browser_automation_tasks` collection.
//! Status strings are the automation workers' vocabulary and pass
//! through unchanged.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use cf_domain::error::{Error, Result};
use cf_store::tables::{BrowserTaskRow, NewBrowserTask};
use cf_store::StoreClient;

pub struct BrowserTaskTracker {
    store: Arc<StoreClient>,
}

/// Condensed task state as callers poll it.
#[derive(Debug, Clone, Serialize)]
pub struct BrowserTaskStatus {
    pub task_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
}

impl BrowserTaskStatus {
    fn from_row(row: BrowserTaskRow) -> Self {
        Self {
            task_id: row.id,
            status: row.status,
            output: row.output,
            progress: row.progress,
            current_url: row.current_url,
        }
    }
}

/// Build the patch for a status transition. A result, when present,
/// rides along in the same write.
pub(crate) fn status_patch(status: &str, output: Option<&serde_json::Value>) -> serde_json::Value {
    match output {
        Some(output) => serde_json::json!({ "status": status, "output": output }),
        None => serde_json::json!({ "status": status }),
    }
}

impl BrowserTaskTracker {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    /// Create a pending task and return its row.
    pub async fn create(
        &self,
        input: impl Into<String>,
        user_id: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<BrowserTaskRow> {
        self.store
            .insert_browser_task(&NewBrowserTask {
                input: input.into(),
                user_id: user_id.into(),
                status: "pending".into(),
                environment: environment.into(),
            })
            .await
    }

    /// Update a task's status, optionally attaching the worker output.
    pub async fn update_status(
        &self,
        task_id: Uuid,
        status: &str,
        output: Option<&serde_json::Value>,
    ) -> Result<()> {
        let patched = self
            .store
            .update_browser_task(task_id, &status_patch(status, output))
            .await?;
        if patched == 0 {
            return Err(Error::store(
                "browser_automation_tasks",
                format!("task {task_id} not found"),
            ));
        }
        Ok(())
    }

    /// Current state of a task.
    pub async fn check_status(&self, task_id: Uuid) -> Result<Option<BrowserTaskStatus>> {
        Ok(self
            .store
            .get_browser_task(task_id)
            .await?
            .map(BrowserTaskStatus::from_row))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
