//! REST client for the hosted table store.
//!
//! `StoreClient` wraps a `reqwest::Client` and speaks the store's
//! PostgREST-style row API (`/rest/v1/<collection>` with `select`,
//! `eq.`, `in.` filters), with automatic retry + exponential back-off
//! on transient (5xx / timeout) failures. 4xx is permanent. Row shapes
//! are consumed as-is — no validation beyond deserialization.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use cf_domain::config::{StorageConfig, StoreConfig};
use cf_domain::error::{Error, Result};
use cf_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Client for the hosted row store.
///
/// Created once at bootstrap and shared by Arc. The underlying
/// `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: Client,
    base_url: String,
    anon_key: Option<String>,
    service_key: Option<String>,
    max_retries: u32,
    pub(crate) storage: StorageConfig,
}

/// Which credential a request is decorated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// Publishable key — reads and user-scoped writes.
    Anon,
    /// Service-role key — privileged writes (payments, credits).
    Service,
}

impl StoreClient {
    /// Build a new client from the shared config. Keys are read from
    /// the environment once, here.
    pub fn new(cfg: &StoreConfig, storage: &StorageConfig) -> Result<Self> {
        let anon_key = std::env::var(&cfg.anon_key_env).ok().filter(|k| !k.is_empty());
        let service_key = std::env::var(&cfg.service_key_env).ok().filter(|k| !k.is_empty());
        Self::with_keys(cfg, storage, anon_key, service_key)
    }

    /// Build a client with explicit keys (used by tests).
    pub fn with_keys(
        cfg: &StoreConfig,
        storage: &StorageConfig,
        anon_key: Option<String>,
        service_key: Option<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            anon_key,
            service_key,
            max_retries: cfg.max_retries,
            storage: storage.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn anon_key(&self) -> Option<&str> {
        self.anon_key.as_deref()
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Full URL for a collection, e.g. `rest_url("user_credits")`.
    pub(crate) fn rest_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{collection}", self.base_url)
    }

    /// Decorate a request with the store headers for the given role.
    /// Falls back to the anon key when no service key is configured so
    /// the failure surfaces as the store's 401 rather than a local one.
    pub(crate) fn decorate(&self, rb: RequestBuilder, role: KeyRole) -> RequestBuilder {
        let key = match role {
            KeyRole::Service => self.service_key.as_deref().or(self.anon_key.as_deref()),
            KeyRole::Anon => self.anon_key.as_deref(),
        };
        let mut rb = rb.header("X-Trace-Id", Uuid::new_v4().to_string());
        if let Some(key) = key {
            rb = rb
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"));
        }
        rb
    }

    // ── retry engine ─────────────────────────────────────────────────

    /// Execute a request with retry + exponential back-off on transient
    /// errors.
    ///
    /// * Retries on 5xx status codes and on timeouts/connection errors.
    /// * Does **not** retry on 4xx (client errors are permanent).
    /// * Emits a `TraceEvent::StoreCall` after every attempt.
    pub(crate) async fn execute_with_retry(
        &self,
        collection: &str,
        build_request: impl Fn() -> RequestBuilder,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            let start = Instant::now();
            let result = build_request().send().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    TraceEvent::StoreCall {
                        collection: collection.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    if resp.status().is_server_error() {
                        // 5xx — transient, retry
                        let body = resp.text().await.unwrap_or_default();
                        last_err = Some(Error::store(
                            collection,
                            format!("returned {status}: {body}"),
                        ));
                        continue;
                    }

                    if resp.status().is_client_error() {
                        // 4xx — permanent, do NOT retry
                        let resp_status = resp.status();
                        let body = resp.text().await.unwrap_or_default();
                        if resp_status == StatusCode::UNAUTHORIZED
                            || resp_status == StatusCode::FORBIDDEN
                        {
                            return Err(Error::Auth(format!(
                                "{collection} auth failed ({status}): {body}"
                            )));
                        }
                        return Err(Error::store(
                            collection,
                            format!("returned {status}: {body}"),
                        ));
                    }

                    return Ok(resp);
                }
                Err(e) => {
                    let status = e.status().map(|s| s.as_u16()).unwrap_or(0);

                    TraceEvent::StoreCall {
                        collection: collection.to_owned(),
                        status,
                        duration_ms,
                    }
                    .emit();

                    last_err = Some(from_reqwest(collection, e));
                    // Timeouts and connection errors are transient — retry
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::store(collection, "all retries exhausted")))
    }

    // ── row operations ───────────────────────────────────────────────

    /// Select rows matching the query filters.
    ///
    /// `filters` are raw PostgREST pairs, e.g.
    /// `[("id", "in.(a,b,c)"), ("select", "*")]`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        collection: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = self.rest_url(collection);
        let resp = self
            .execute_with_retry(collection, || {
                self.decorate(self.http.get(&url).query(filters), KeyRole::Anon)
            })
            .await?;

        let body = resp.text().await.map_err(|e| from_reqwest(collection, e))?;
        serde_json::from_str(&body).map_err(|e| {
            Error::store(collection, format!("failed to parse rows: {e}: {body}"))
        })
    }

    /// Select at most one row; `None` when the filter matched nothing.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>> {
        let mut rows = self.select::<T>(collection, filters).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Insert rows, returning the stored representation.
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        collection: &str,
        rows: &T,
        role: KeyRole,
    ) -> Result<Vec<R>> {
        let url = self.rest_url(collection);
        let resp = self
            .execute_with_retry(collection, || {
                self.decorate(
                    self.http
                        .post(&url)
                        .header("Prefer", "return=representation")
                        .json(rows),
                    role,
                )
            })
            .await?;

        let body = resp.text().await.map_err(|e| from_reqwest(collection, e))?;
        serde_json::from_str(&body).map_err(|e| {
            Error::store(collection, format!("failed to parse inserted rows: {e}: {body}"))
        })
    }

    /// Patch rows matching the filters. Returns the number of rows the
    /// store reports as updated (0 when the filter matched nothing).
    pub async fn update<T: Serialize>(
        &self,
        collection: &str,
        filters: &[(&str, String)],
        patch: &T,
        role: KeyRole,
    ) -> Result<usize> {
        let url = self.rest_url(collection);
        let resp = self
            .execute_with_retry(collection, || {
                self.decorate(
                    self.http
                        .patch(&url)
                        .query(filters)
                        .header("Prefer", "return=representation")
                        .json(patch),
                    role,
                )
            })
            .await?;

        let body = resp.text().await.map_err(|e| from_reqwest(collection, e))?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&body).map_err(|e| {
            Error::store(collection, format!("failed to parse updated rows: {e}: {body}"))
        })?;
        Ok(rows.len())
    }
}

/// Map a reqwest error onto the shared error type.
pub(crate) fn from_reqwest(context: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(format!("{context}: {e}"))
    } else {
        Error::Http(format!("{context}: {e}"))
    }
}

/// Build an `in.(...)` filter value from a list of ids.
pub fn in_filter<S: AsRef<str>>(ids: &[S]) -> String {
    let joined = ids
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({joined})")
}

/// Build an `eq.` filter value.
pub fn eq_filter(value: impl AsRef<str>) -> String {
    format!("eq.{}", value.as_ref())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use cf_domain::config::{StorageConfig, StoreConfig};

    fn client() -> StoreClient {
        StoreClient::with_keys(
            &StoreConfig::default(),
            &StorageConfig::default(),
            Some("anon".into()),
            None,
        )
        .unwrap()
    }

    #[test]
    fn rest_url_joins_collection() {
        let c = client();
        assert_eq!(
            c.rest_url("user_credits"),
            "http://127.0.0.1:54321/rest/v1/user_credits"
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let cfg = StoreConfig {
            base_url: "https://store.example.com/".into(),
            ..StoreConfig::default()
        };
        let c = StoreClient::with_keys(&cfg, &StorageConfig::default(), None, None).unwrap();
        assert_eq!(c.base_url(), "https://store.example.com");
    }

    #[test]
    fn in_filter_joins_ids() {
        assert_eq!(in_filter(&["a", "b", "c"]), "in.(a,b,c)");
        assert_eq!(in_filter::<&str>(&[]), "in.()");
    }

    #[test]
    fn eq_filter_prefixes() {
        assert_eq!(eq_filter("user-1"), "eq.user-1");
    }
}
