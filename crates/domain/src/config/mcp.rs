use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MCP (tool-connection) servers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct McpConfig {
    /// External tool servers, keyed by server id.
    #[serde(default)]
    pub servers: HashMap<String, McpServerConfig>,
}

/// One external MCP server, spawned as a child process speaking
/// newline-delimited JSON-RPC over stdin/stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default = "d_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn d_request_timeout_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_has_no_servers() {
        let cfg: McpConfig = toml::from_str("").unwrap();
        assert!(cfg.servers.is_empty());
    }

    #[test]
    fn server_entry_parses() {
        let cfg: McpConfig = toml::from_str(
            r#"
            [servers.assets]
            command = "asset-server"
            args = ["--stdio"]
            "#,
        )
        .unwrap();
        let server = &cfg.servers["assets"];
        assert_eq!(server.command, "asset-server");
        assert_eq!(server.args, vec!["--stdio"]);
        assert_eq!(server.request_timeout_ms, 30_000);
    }
}
