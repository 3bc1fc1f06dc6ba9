//! Agent kinds.
//!
//! Agents are the named conversational roles that produce messages or
//! invoke tools. The built-in set is closed; anything else must be the
//! UUID of a user-defined agent. Parsing is strict — an unknown
//! non-UUID name is an error, never a silent fallback.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named conversational role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AgentKind {
    Main,
    Script,
    Image,
    Tool,
    Scene,
    /// User-defined agent, identified by its row id.
    Custom(Uuid),
}

impl AgentKind {
    pub const BUILT_IN: [AgentKind; 5] = [
        AgentKind::Main,
        AgentKind::Script,
        AgentKind::Image,
        AgentKind::Tool,
        AgentKind::Scene,
    ];

    pub fn is_built_in(self) -> bool {
        !matches!(self, AgentKind::Custom(_))
    }

    /// Total mapping to the backing-store type column. Every variant
    /// maps; there is no default arm to fall through to.
    pub fn db_type(self) -> &'static str {
        match self {
            AgentKind::Main => "main",
            AgentKind::Script => "script",
            AgentKind::Image => "image",
            AgentKind::Tool => "tool",
            AgentKind::Scene => "scene",
            AgentKind::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Custom(id) => write!(f, "{id}"),
            other => f.write_str(other.db_type()),
        }
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(AgentKind::Main),
            "script" => Ok(AgentKind::Script),
            "image" => Ok(AgentKind::Image),
            "tool" => Ok(AgentKind::Tool),
            "scene" => Ok(AgentKind::Scene),
            other => Uuid::parse_str(other)
                .map(AgentKind::Custom)
                .map_err(|_| format!("unknown agent kind: {s}")),
        }
    }
}

impl TryFrom<String> for AgentKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AgentKind> for String {
    fn from(kind: AgentKind) -> Self {
        kind.to_string()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_names_round_trip() {
        for kind in AgentKind::BUILT_IN {
            let parsed: AgentKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn parse_is_case_insensitive_for_built_ins() {
        assert_eq!("Script".parse::<AgentKind>().unwrap(), AgentKind::Script);
        assert_eq!("SCENE".parse::<AgentKind>().unwrap(), AgentKind::Scene);
    }

    #[test]
    fn uuid_parses_as_custom() {
        let id = Uuid::new_v4();
        let kind: AgentKind = id.to_string().parse().unwrap();
        assert_eq!(kind, AgentKind::Custom(id));
        assert!(!kind.is_built_in());
        assert_eq!(kind.db_type(), "custom");
    }

    #[test]
    fn unknown_name_is_rejected_not_defaulted() {
        let err = "sparkles".parse::<AgentKind>().unwrap_err();
        assert!(err.contains("sparkles"));
    }

    #[test]
    fn db_type_is_total() {
        for kind in AgentKind::BUILT_IN {
            assert!(!kind.db_type().is_empty());
        }
        assert_eq!(AgentKind::Custom(Uuid::nil()).db_type(), "custom");
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&AgentKind::Image).unwrap();
        assert_eq!(json, "\"image\"");
        let kind: AgentKind = serde_json::from_str("\"scene\"").unwrap();
        assert_eq!(kind, AgentKind::Scene);
        assert!(serde_json::from_str::<AgentKind>("\"nope\"").is_err());
    }
}
