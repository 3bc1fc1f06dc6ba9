//! AppState construction and background-task spawning extracted from
//! `main.rs`, so CLI commands and tests can boot the full runtime
//! without an HTTP listener.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use cf_domain::config::{Config, ConfigSeverity, StoreConfig};
use cf_jobs::{BrowserTaskTracker, MediaJobPoller};
use cf_mcp_client::McpManager;
use cf_store::{BucketClient, FunctionsClient, SessionProvider, StoreClient};
use cf_tools::builtin::register_builtins;
use cf_tools::{ToolExecutor, ToolRegistry};

use crate::runtime::conversation::ConversationStore;
use crate::runtime::pipeline::MessagePipeline;
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Backing store ────────────────────────────────────────────────
    let store = Arc::new(
        StoreClient::new(&config.store, &config.storage).context("initializing store client")?,
    );
    let buckets = Arc::new(BucketClient::new((*store).clone()));
    tracing::info!(base_url = %config.store.base_url, "store client ready");

    // ── Orchestrator upstream (multi-agent-chat passthrough) ─────────
    let orchestrator = config
        .orchestrator
        .upstream_url
        .as_ref()
        .map(|url| {
            let upstream = StoreConfig {
                base_url: url.clone(),
                timeout_ms: config.orchestrator.timeout_ms,
                ..config.store.clone()
            };
            FunctionsClient::new(&upstream).map(Arc::new)
        })
        .transpose()
        .context("initializing orchestrator client")?;
    match &orchestrator {
        Some(_) => tracing::info!(
            upstream = %config.orchestrator.upstream_url.as_deref().unwrap_or_default(),
            "orchestrator upstream ready"
        ),
        None => tracing::info!("no orchestrator upstream — multi-agent-chat will answer 503"),
    }

    // ── Session provider ─────────────────────────────────────────────
    let session = Arc::new(SessionProvider::new());
    tracing::info!("session provider ready");

    // ── Tool registry + executor ─────────────────────────────────────
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry).context("registering built-in tools")?;
    let tool_count = registry.len();
    let executor = Arc::new(ToolExecutor::new(
        Arc::new(registry),
        Some(store.clone()),
        config.tools.clone(),
    ));
    tracing::info!(tools = tool_count, "tool registry ready");

    // ── MCP (tool-connection) servers ────────────────────────────────
    let mcp = Arc::new(McpManager::connect_all(&config.mcp).await);
    tracing::info!(
        servers = mcp.server_count(),
        configured = config.mcp.servers.len(),
        "tool servers connected"
    );

    // ── Media-job poller ─────────────────────────────────────────────
    let poller = Arc::new(MediaJobPoller::new(
        store.clone(),
        config.polling.evict_after_cycles,
    ));
    let poller_cancel = CancellationToken::new();
    tracing::info!(interval_ms = config.polling.interval_ms, "media job poller ready");

    // ── Browser-automation tracker ───────────────────────────────────
    let browser_tasks = Arc::new(BrowserTaskTracker::new(store.clone()));

    // ── Conversation store + pipeline ────────────────────────────────
    let conversations = Arc::new(ConversationStore::new());
    let pipeline = Arc::new(MessagePipeline::new(
        conversations.clone(),
        executor.clone(),
        poller.clone(),
        session.clone(),
    ));
    tracing::info!("conversation pipeline ready");

    // ── API token (read once, hash for constant-time comparison) ─────
    let api_token_hash = {
        let env_var = &config.server.api_token_env;
        match std::env::var(env_var).ok().filter(|t| !t.is_empty()) {
            Some(token) => {
                tracing::info!(env_var = %env_var, "API token loaded, auth enforced");
                Some(Sha256::digest(token.as_bytes()).to_vec())
            }
            None => {
                tracing::warn!(
                    env_var = %env_var,
                    "no API token configured — API endpoints are unauthenticated"
                );
                None
            }
        }
    };

    // ── Payment secrets (read once) ──────────────────────────────────
    let payment_salt = std::env::var(&config.payments.merchant_salt_env)
        .ok()
        .filter(|s| !s.is_empty());
    if payment_salt.is_none() {
        tracing::warn!(
            env_var = %config.payments.merchant_salt_env,
            "no merchant salt configured — payment webhooks will be rejected"
        );
    }

    Ok(AppState {
        config,
        store,
        buckets,
        orchestrator,
        conversations,
        pipeline,
        executor,
        mcp,
        poller,
        browser_tasks,
        poller_cancel,
        session,
        api_token_hash,
        payment_salt,
    })
}

/// Spawn the background loops that run for the lifetime of the server.
pub fn spawn_background_tasks(state: &AppState) {
    let poller = state.poller.clone();
    let interval_ms = state.config.polling.interval_ms;
    let cancel = state.poller_cancel.clone();
    tokio::spawn(async move {
        poller.run(interval_ms, cancel).await;
    });
    tracing::info!("background tasks spawned");
}
