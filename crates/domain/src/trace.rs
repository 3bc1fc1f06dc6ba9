use serde::Serialize;

/// Structured trace events emitted across all Clipflow crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    StoreCall {
        collection: String,
        status: u16,
        duration_ms: u64,
    },
    BucketUpload {
        bucket: String,
        object: String,
        bytes: usize,
    },
    FunctionInvoked {
        name: String,
        status: u16,
        duration_ms: u64,
    },
    ToolExecuted {
        tool: String,
        user_id: String,
        request_id: String,
        credits_charged: u32,
        success: bool,
    },
    JobsPolled {
        tracked: usize,
        updated: usize,
        dropped_stale: bool,
    },
    WebhookReceived {
        transaction_id: String,
        trusted: bool,
    },
    SessionChanged {
        user_id: String,
        signed_in: bool,
    },
    McpConnected {
        server: String,
        tools: usize,
    },
    MessageAppended {
        conversation_id: String,
        role: String,
        requests_tool: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "cf_event");
    }
}
