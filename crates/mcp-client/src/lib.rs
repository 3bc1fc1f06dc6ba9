//! `cf-mcp-client` — tool-connection (MCP) client for Clipflow.
//!
//! External tool servers are spawned as child processes speaking
//! newline-delimited JSON-RPC 2.0 over stdin/stdout. The surface is
//! deliberately small: connect, list tools, call a tool.
//!
//! ```rust,ignore
//! use cf_mcp_client::McpManager;
//!
//! let manager = McpManager::connect_all(&config.mcp).await;
//! for (server_id, def) in manager.list_tools() {
//!     println!("mcp:{server_id}:{}", def.name);
//! }
//! let text = manager.call_tool("assets", "search_stock", json!({"q": "red shoe"})).await?;
//! ```

pub mod client;
pub mod protocol;
pub mod transport;

pub use client::{McpClient, McpError, McpManager};
pub use protocol::McpToolDef;
