use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Backing store (hosted tables + storage + functions)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the hosted backing store. One base URL
/// serves the table REST API (`/rest/v1`), the storage API
/// (`/storage/v1`), and the serverless functions (`/functions/v1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Env var holding the publishable (anon) API key.
    #[serde(default = "d_anon_key_env")]
    pub anon_key_env: String,
    /// Env var holding the service-role key used for privileged writes
    /// (payment transactions, credit deductions). Optional — when the
    /// var is unset those writes fail with an auth error.
    #[serde(default = "d_service_key_env")]
    pub service_key_env: String,
    #[serde(default = "d_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries on transient (5xx / timeout) failures. 4xx is permanent.
    #[serde(default = "d_max_retries")]
    pub max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            anon_key_env: d_anon_key_env(),
            service_key_env: d_service_key_env(),
            timeout_ms: d_timeout_ms(),
            max_retries: d_max_retries(),
        }
    }
}

/// Storage bucket defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket used when a caller does not name one.
    #[serde(default = "d_default_bucket")]
    pub default_bucket: String,
    /// `cache-control: max-age` set on uploaded objects.
    #[serde(default = "d_cache_seconds")]
    pub cache_seconds: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_bucket: d_default_bucket(),
            cache_seconds: d_cache_seconds(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "http://127.0.0.1:54321".into()
}

fn d_anon_key_env() -> String {
    "CLIPFLOW_STORE_ANON_KEY".into()
}

fn d_service_key_env() -> String {
    "CLIPFLOW_STORE_SERVICE_KEY".into()
}

fn d_timeout_ms() -> u64 {
    10_000
}

fn d_max_retries() -> u32 {
    2
}

fn d_default_bucket() -> String {
    "media".into()
}

fn d_cache_seconds() -> u32 {
    3600
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_defaults() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.base_url, "http://127.0.0.1:54321");
        assert_eq!(cfg.timeout_ms, 10_000);
        assert_eq!(cfg.max_retries, 2);
    }

    #[test]
    fn storage_defaults() {
        let cfg = StorageConfig::default();
        assert_eq!(cfg.default_bucket, "media");
        assert_eq!(cfg.cache_seconds, 3600);
    }
}
