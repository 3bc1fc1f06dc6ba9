//! Tool-server connections and dispatch.
//!
//! [`McpClient`] is one connected server: spawn, handshake, discover.
//! [`McpManager`] holds every configured connection and routes calls.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use cf_domain::config::{McpConfig, McpServerConfig};
use cf_domain::trace::TraceEvent;

use crate::protocol::McpToolDef;
use crate::transport::{StdioTransport, TransportError};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Errors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol: {0}")]
    Protocol(String),

    #[error("unknown server: {0}")]
    UnknownServer(String),

    #[error("server {server} has no tool named {tool}")]
    UnknownTool { server: String, tool: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct ToolsListResult {
    #[serde(default)]
    tools: Vec<McpToolDef>,
}

#[derive(Debug, Deserialize)]
struct ToolCallResult {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default, rename = "isError")]
    is_error: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

fn initialize_params() -> Value {
    serde_json::json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {},
        "clientInfo": {
            "name": "clipflow",
            "version": env!("CARGO_PKG_VERSION"),
        }
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// McpClient
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One connected tool server.
pub struct McpClient {
    pub id: String,
    pub tools: Vec<McpToolDef>,
    transport: StdioTransport,
}

impl McpClient {
    /// Spawn the server process, perform the handshake, discover tools.
    pub async fn connect(id: &str, config: &McpServerConfig) -> Result<Self, McpError> {
        let transport = StdioTransport::spawn(config)?;

        let resp = transport
            .send_request("initialize", Some(initialize_params()))
            .await?;
        resp.into_result()
            .map_err(|err| McpError::Protocol(format!("initialize failed: {}", err.message)))?;

        transport
            .send_notification("notifications/initialized")
            .await?;

        let tools = match transport.send_request("tools/list", None).await?.into_result() {
            Ok(result) => {
                let parsed: ToolsListResult = serde_json::from_value(result)
                    .map_err(|e| McpError::Protocol(format!("bad tools/list result: {e}")))?;
                parsed.tools
            }
            Err(err) => {
                tracing::warn!(server = id, error = %err.message, "tools/list returned error, server will have no tools");
                Vec::new()
            }
        };

        TraceEvent::McpConnected {
            server: id.to_owned(),
            tools: tools.len(),
        }
        .emit();

        Ok(Self {
            id: id.to_owned(),
            tools,
            transport,
        })
    }

    pub fn is_alive(&self) -> bool {
        self.transport.is_alive()
    }

    /// Call a tool and flatten its text content blocks into one string.
    pub async fn call_tool(&self, tool: &str, args: Value) -> Result<String, McpError> {
        if !self.tools.iter().any(|t| t.name == tool) {
            return Err(McpError::UnknownTool {
                server: self.id.clone(),
                tool: tool.to_owned(),
            });
        }

        let params = serde_json::json!({ "name": tool, "arguments": args });
        let result = self
            .transport
            .send_request("tools/call", Some(params))
            .await?
            .into_result()
            .map_err(|err| McpError::Protocol(format!("tools/call failed: {}", err.message)))?;

        let parsed: ToolCallResult = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("bad tools/call result: {e}")))?;

        let text = parsed
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if parsed.is_error {
            return Err(McpError::Protocol(format!("tool reported error: {text}")));
        }
        Ok(text)
    }

    pub async fn shutdown(&self) {
        self.transport.shutdown().await;
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// McpManager
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// All configured tool-server connections.
///
/// Servers that fail to connect are skipped with a warning — a broken
/// external server must not block gateway startup.
pub struct McpManager {
    servers: HashMap<String, McpClient>,
}

impl McpManager {
    pub fn empty() -> Self {
        Self {
            servers: HashMap::new(),
        }
    }

    pub async fn connect_all(config: &McpConfig) -> Self {
        let mut servers = HashMap::new();
        for (id, server_config) in &config.servers {
            match McpClient::connect(id, server_config).await {
                Ok(client) => {
                    servers.insert(id.clone(), client);
                }
                Err(e) => {
                    tracing::warn!(server = %id, error = %e, "tool server failed to connect, skipping");
                }
            }
        }
        Self { servers }
    }

    /// All discovered tools as `(server_id, descriptor)` pairs.
    pub fn list_tools(&self) -> Vec<(&str, &McpToolDef)> {
        let mut tools: Vec<(&str, &McpToolDef)> = self
            .servers
            .values()
            .flat_map(|s| s.tools.iter().map(move |t| (s.id.as_str(), t)))
            .collect();
        tools.sort_by(|a, b| (a.0, a.1.name.as_str()).cmp(&(b.0, b.1.name.as_str())));
        tools
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        args: Value,
    ) -> Result<String, McpError> {
        let client = self
            .servers
            .get(server)
            .ok_or_else(|| McpError::UnknownServer(server.to_owned()))?;
        client.call_tool(tool, args).await
    }

    pub async fn shutdown(&self) {
        for client in self.servers.values() {
            client.shutdown().await;
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
