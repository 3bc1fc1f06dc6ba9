//! Serverless function invocation.
//!
//! Functions are invoked by name; the request body is the raw JSON
//! payload, forwarded as-is, and the response comes back unchanged.
//! The caller owns interpretation of both sides.

use std::time::{Duration, Instant};

use reqwest::Client;

use cf_domain::config::StoreConfig;
use cf_domain::error::{Error, Result};
use cf_domain::trace::TraceEvent;

/// Invoking side of the serverless endpoints.
#[derive(Debug, Clone)]
pub struct FunctionsClient {
    http: Client,
    base_url: String,
    anon_key: Option<String>,
}

impl FunctionsClient {
    pub fn new(cfg: &StoreConfig) -> Result<Self> {
        let anon_key = std::env::var(&cfg.anon_key_env).ok().filter(|k| !k.is_empty());
        Self::with_key(cfg, anon_key)
    }

    pub fn with_key(cfg: &StoreConfig, anon_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            anon_key,
        })
    }

    pub(crate) fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{name}", self.base_url)
    }

    /// Invoke a function by name. Payload in, response out, both
    /// verbatim. Non-2xx responses become errors carrying the body.
    pub async fn invoke(&self, name: &str, payload: &serde_json::Value) -> Result<serde_json::Value> {
        let url = self.function_url(name);
        let mut rb = self.http.post(&url).json(payload);
        if let Some(ref key) = self.anon_key {
            rb = rb.header("Authorization", format!("Bearer {key}"));
        }

        let start = Instant::now();
        let resp = rb.send().await.map_err(|e| Error::Function {
            name: name.into(),
            message: e.to_string(),
        })?;
        let status = resp.status();

        TraceEvent::FunctionInvoked {
            name: name.into(),
            status: status.as_u16(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();

        let body = resp.text().await.map_err(|e| Error::Function {
            name: name.into(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(Error::Function {
                name: name.into(),
                message: format!("returned {status}: {body}"),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Function {
            name: name.into(),
            message: format!("non-JSON response: {e}: {body}"),
        })
    }
}
