use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tools
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// When true (the default), a tool with `required_credits > 0`
    /// checks the user's balance before executing and aborts with an
    /// insufficient-credits error.
    #[serde(default = "d_true")]
    pub enforce_credits: bool,
    /// Record a usage row after each successful execution. Tracking
    /// failures are logged and swallowed — they never fail the tool.
    #[serde(default = "d_true")]
    pub track_usage: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enforce_credits: true,
            track_usage: true,
        }
    }
}

fn d_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enforce_and_track() {
        let cfg = ToolsConfig::default();
        assert!(cfg.enforce_credits);
        assert!(cfg.track_usage);
    }

    #[test]
    fn can_disable_enforcement() {
        let cfg: ToolsConfig = toml::from_str("enforce_credits = false").unwrap();
        assert!(!cfg.enforce_credits);
        assert!(cfg.track_usage);
    }
}
