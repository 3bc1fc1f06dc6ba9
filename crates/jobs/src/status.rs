//! Polled job state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cf_store::tables::{JobKind, MediaJobRow};

/// Progress reported when the store row carries no progress column.
pub const DEFAULT_PROGRESS: u8 = 100;

/// A tracked job: which collection it lives in plus its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub kind: JobKind,
    pub id: String,
}

impl JobKey {
    pub fn new(kind: JobKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Last-known state of one job, as republished to consumers.
///
/// `status` is the store's status string passed through unchanged —
/// the poller attaches no meaning to it beyond eviction bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaJobStatus {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    pub progress: u8,
}

impl MediaJobStatus {
    /// Initial state for a job that has not been seen in the store yet.
    pub fn pending(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: "pending".into(),
            result_url: None,
            progress: 0,
        }
    }

    /// State derived from a store row. Progress defaults to
    /// [`DEFAULT_PROGRESS`] when the row has no progress column.
    pub fn from_row(row: &MediaJobRow) -> Self {
        Self {
            id: row.id.clone(),
            status: row.status.clone(),
            result_url: row.result_url.clone(),
            progress: row.progress.unwrap_or(DEFAULT_PROGRESS),
        }
    }

    /// Conventional terminal markers, used only to stop tracking
    /// settled jobs eventually. Unrecognized statuses keep polling.
    pub fn looks_terminal(&self) -> bool {
        matches!(
            self.status.as_str(),
            "completed" | "done" | "failed" | "error" | "cancelled"
        )
    }
}

/// The published mapping job-id → last-known status.
pub type JobSnapshot = HashMap<String, MediaJobStatus>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
