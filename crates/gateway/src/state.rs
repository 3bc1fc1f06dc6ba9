use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use cf_domain::config::Config;
use cf_jobs::{BrowserTaskTracker, MediaJobPoller};
use cf_mcp_client::McpManager;
use cf_store::{BucketClient, FunctionsClient, SessionProvider, StoreClient};
use cf_tools::ToolExecutor;

use crate::runtime::conversation::ConversationStore;
use crate::runtime::pipeline::MessagePipeline;

/// Shared application state passed to all API handlers.
///
/// Fields are grouped by concern:
/// - **Core services** — config, backing store, buckets, orchestrator
/// - **Conversation runtime** — conversations, pipeline, tools
/// - **Jobs** — media poller, browser-automation tracker
/// - **Auth & security** — session provider, startup-computed token
///   hash, payment salt
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub store: Arc<StoreClient>,
    pub buckets: Arc<BucketClient>,
    /// Invoking side of the `multi-agent-chat` upstream. `None` when no
    /// orchestrator is configured — the endpoint answers 503.
    pub orchestrator: Option<Arc<FunctionsClient>>,

    // ── Conversation runtime ──────────────────────────────────────────
    pub conversations: Arc<ConversationStore>,
    pub pipeline: Arc<MessagePipeline>,
    pub executor: Arc<ToolExecutor>,
    pub mcp: Arc<McpManager>,

    // ── Jobs ──────────────────────────────────────────────────────────
    pub poller: Arc<MediaJobPoller>,
    pub browser_tasks: Arc<BrowserTaskTracker>,
    /// Cancels the background poll loop on shutdown.
    pub poller_cancel: CancellationToken,

    // ── Auth & security (startup-computed) ────────────────────────────
    /// Process-wide auth session, injected by reference everywhere.
    pub session: Arc<SessionProvider>,
    /// SHA-256 hash of the API bearer token (read once at startup).
    /// `None` = dev mode (no auth enforced).
    pub api_token_hash: Option<Vec<u8>>,
    /// Merchant salt for payment-webhook signature verification
    /// (read once at startup). `None` = webhooks are rejected.
    pub payment_salt: Option<String>,
}
