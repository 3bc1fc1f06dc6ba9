//! Typed rows and collection accessors.
//!
//! Row shapes mirror the hosted schema and are consumed as-is; the
//! store is the source of truth for their meaning. Status columns stay
//! opaque strings — only the task lifecycle has a closed enum, and
//! that lives in `cf-domain`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cf_domain::error::Result;

use crate::client::{eq_filter, in_filter, KeyRole, StoreClient};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Media generation jobs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Image,
    Video,
}

impl JobKind {
    pub fn collection(self) -> &'static str {
        match self {
            JobKind::Image => "image_generation_jobs",
            JobKind::Video => "video_generation_jobs",
        }
    }
}

/// One asynchronous generation job as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaJobRow {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub result_url: Option<String>,
    /// Not every deployment has this column; absent means "no signal".
    #[serde(default)]
    pub progress: Option<u8>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Credits & usage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreditsRow {
    pub user_id: String,
    pub credits_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUsageRow {
    pub user_id: String,
    pub tool_name: String,
    pub credits_used: u32,
    pub used_at: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Catalog collections
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryTypeRow {
    pub id: i64,
    pub story_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceOptionRow {
    pub id: String,
    pub name: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Payments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransactionRow {
    pub transaction_id: String,
    pub status: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub processor_transaction_id: Option<String>,
    #[serde(default)]
    pub related_order_id: Option<Uuid>,
    #[serde(default)]
    pub webhook_received_at: Option<DateTime<Utc>>,
}

/// Patch applied to a transaction when its webhook arrives.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentWebhookPatch {
    pub payment_status: String,
    pub processor_transaction_id: Option<String>,
    pub status: String,
    pub webhook_received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomOrderRow {
    pub id: Uuid,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Browser automation tasks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserTaskRow {
    pub id: Uuid,
    pub input: String,
    pub user_id: String,
    pub status: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub current_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBrowserTask {
    pub input: String,
    pub user_id: String,
    pub status: String,
    pub environment: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Collection accessors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl StoreClient {
    /// Current rows for the given job ids. The store only returns rows
    /// it has — callers must treat missing ids as "no news".
    pub async fn fetch_media_jobs(&self, kind: JobKind, ids: &[String]) -> Result<Vec<MediaJobRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(
            kind.collection(),
            &[
                ("select", "id,status,result_url,progress".into()),
                ("id", in_filter(ids)),
            ],
        )
        .await
    }

    pub async fn get_user_credits(&self, user_id: &str) -> Result<Option<UserCreditsRow>> {
        self.select_one(
            "user_credits",
            &[
                ("select", "user_id,credits_remaining".into()),
                ("user_id", eq_filter(user_id)),
            ],
        )
        .await
    }

    /// Privileged: overwrite a user's remaining balance.
    pub async fn set_user_credits(&self, user_id: &str, remaining: u32) -> Result<usize> {
        self.update(
            "user_credits",
            &[("user_id", eq_filter(user_id))],
            &serde_json::json!({ "credits_remaining": remaining }),
            KeyRole::Service,
        )
        .await
    }

    pub async fn record_tool_usage(&self, row: &ToolUsageRow) -> Result<()> {
        let _: Vec<ToolUsageRow> = self.insert("tool_usage", &[row], KeyRole::Anon).await?;
        Ok(())
    }

    pub async fn list_story_types(&self) -> Result<Vec<StoryTypeRow>> {
        self.select("story_types", &[("select", "id,story_type".into())])
            .await
    }

    pub async fn list_voice_options(&self) -> Result<Vec<VoiceOptionRow>> {
        self.select("voice_options", &[("select", "id,name".into())])
            .await
    }

    // ── payments ────────────────────────────────────────────────────

    pub async fn get_payment_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentTransactionRow>> {
        self.select_one(
            "payment_transactions",
            &[("transaction_id", eq_filter(transaction_id))],
        )
        .await
    }

    /// Privileged: apply the webhook outcome to a transaction.
    pub async fn apply_payment_webhook(
        &self,
        transaction_id: &str,
        patch: &PaymentWebhookPatch,
    ) -> Result<usize> {
        self.update(
            "payment_transactions",
            &[("transaction_id", eq_filter(transaction_id))],
            patch,
            KeyRole::Service,
        )
        .await
    }

    /// Privileged: advance a related order after its payment settles.
    pub async fn update_order_status(&self, order_id: Uuid, status: &str) -> Result<usize> {
        self.update(
            "custom_orders",
            &[("id", eq_filter(order_id.to_string()))],
            &serde_json::json!({ "status": status, "updated_at": Utc::now() }),
            KeyRole::Service,
        )
        .await
    }

    // ── browser automation ──────────────────────────────────────────

    pub async fn insert_browser_task(&self, task: &NewBrowserTask) -> Result<BrowserTaskRow> {
        let mut rows: Vec<BrowserTaskRow> = self
            .insert("browser_automation_tasks", &[task], KeyRole::Anon)
            .await?;
        rows.pop().ok_or_else(|| {
            cf_domain::error::Error::store(
                "browser_automation_tasks",
                "insert returned no representation",
            )
        })
    }

    pub async fn get_browser_task(&self, id: Uuid) -> Result<Option<BrowserTaskRow>> {
        self.select_one(
            "browser_automation_tasks",
            &[("id", eq_filter(id.to_string()))],
        )
        .await
    }

    pub async fn update_browser_task(
        &self,
        id: Uuid,
        patch: &serde_json::Value,
    ) -> Result<usize> {
        self.update(
            "browser_automation_tasks",
            &[("id", eq_filter(id.to_string()))],
            patch,
            KeyRole::Anon,
        )
        .await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
