//! Mock-data mode toggles.
//!
//! Test hooks flip a "mock data" mode by writing fixed keys into a
//! persistent key-value state file. No server interaction — reads and
//! writes stay entirely local.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;

use cf_domain::error::{Error, Result};

pub const KEY_USE_MOCK_DATA: &str = "use_mock_data";
pub const KEY_AUTH_CONFIRMED: &str = "auth_confirmed";
pub const KEY_USER_EMAIL: &str = "user_email";
pub const KEY_AUTH_TIMESTAMP: &str = "auth_timestamp";

/// Persistent key-value state backing the mock-data toggles.
pub struct MockDataStore {
    path: PathBuf,
}

impl MockDataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn save(&self, state: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
        let raw = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, raw).map_err(Error::Io)
    }

    /// Enable mock-data mode: writes the mode flag plus a confirmed
    /// fake auth identity, so downstream auth checks pass.
    pub fn enable(&self, email: &str) -> Result<()> {
        let mut state = self.load();
        state.insert(KEY_USE_MOCK_DATA.into(), "true".into());
        state.insert(KEY_AUTH_CONFIRMED.into(), "true".into());
        state.insert(KEY_USER_EMAIL.into(), email.into());
        state.insert(KEY_AUTH_TIMESTAMP.into(), Utc::now().to_rfc3339());
        self.save(&state)?;
        tracing::info!(email, "mock data mode enabled");
        Ok(())
    }

    /// Disable mock-data mode and drop the fake identity keys.
    pub fn disable(&self) -> Result<()> {
        let mut state = self.load();
        state.insert(KEY_USE_MOCK_DATA.into(), "false".into());
        state.remove(KEY_AUTH_CONFIRMED);
        state.remove(KEY_USER_EMAIL);
        state.remove(KEY_AUTH_TIMESTAMP);
        self.save(&state)?;
        tracing::info!("mock data mode disabled");
        Ok(())
    }

    pub fn is_enabled(&self) -> bool {
        self.load()
            .get(KEY_USE_MOCK_DATA)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
