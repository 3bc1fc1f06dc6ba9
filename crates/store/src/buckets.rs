//! Storage bucket operations.
//!
//! Uploads land under a fresh UUID object key that keeps the original
//! file extension; the returned URL is the store's public object URL.
//! A missing bucket is created public on first use. All failures
//! propagate the underlying store error.

use std::time::Instant;

use serde::Deserialize;
use uuid::Uuid;

use cf_domain::error::{Error, Result};
use cf_domain::trace::TraceEvent;

use crate::client::{from_reqwest, KeyRole, StoreClient};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bucket operations over the shared store connection.
#[derive(Debug, Clone)]
pub struct BucketClient {
    store: StoreClient,
}

#[derive(Debug, Deserialize)]
struct BucketInfo {
    name: String,
}

impl BucketClient {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/v1/object/{bucket}/{key}", self.store.base_url())
    }

    /// Public URL of an object — where uploaded files are served from.
    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{key}",
            self.store.base_url()
        )
    }

    /// Object key for an upload: fresh UUID + the original extension.
    pub fn object_key(filename: &str) -> String {
        let id = Uuid::new_v4();
        match filename.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => format!("{id}.{ext}"),
            _ => id.to_string(),
        }
    }

    /// Create the bucket (public) when it does not exist yet.
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        let list_url = format!("{}/storage/v1/bucket", self.store.base_url());
        let resp = self
            .store
            .execute_with_retry("storage/bucket", || {
                self.store
                    .decorate(self.store.http().get(&list_url), KeyRole::Anon)
            })
            .await?;

        let body = resp.text().await.map_err(|e| from_reqwest(bucket, e))?;
        let buckets: Vec<BucketInfo> = serde_json::from_str(&body).map_err(|e| Error::Bucket {
            bucket: bucket.into(),
            message: format!("failed to parse bucket list: {e}"),
        })?;

        if buckets.iter().any(|b| b.name == bucket) {
            return Ok(());
        }

        tracing::info!(bucket, "creating missing storage bucket");
        self.store
            .execute_with_retry("storage/bucket", || {
                self.store.decorate(
                    self.store
                        .http()
                        .post(&list_url)
                        .json(&serde_json::json!({ "name": bucket, "public": true })),
                    KeyRole::Service,
                )
            })
            .await?;
        Ok(())
    }

    /// Upload a file and return its public URL.
    pub async fn upload_file(
        &self,
        bucket: &str,
        filename: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<String> {
        self.ensure_bucket(bucket).await?;

        let key = Self::object_key(filename);
        let url = self.object_url(bucket, &key);
        let size = bytes.len();
        let cache = format!("max-age={}", self.store.storage.cache_seconds);
        let content_type = content_type.unwrap_or("application/octet-stream").to_owned();

        let start = Instant::now();
        let resp = self
            .store
            .decorate(
                self.store
                    .http()
                    .post(&url)
                    .header("Cache-Control", cache)
                    .header("Content-Type", content_type)
                    .body(bytes),
                KeyRole::Anon,
            )
            .send()
            .await
            .map_err(|e| from_reqwest(bucket, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Bucket {
                bucket: bucket.into(),
                message: format!("upload failed ({status}): {body}"),
            });
        }

        tracing::debug!(bucket, key = %key, elapsed_ms = start.elapsed().as_millis() as u64, "uploaded object");
        TraceEvent::BucketUpload {
            bucket: bucket.into(),
            object: key.clone(),
            bytes: size,
        }
        .emit();

        Ok(self.public_url(bucket, &key))
    }

    /// Delete an object by its key within the bucket.
    pub async fn delete_file(&self, bucket: &str, key: &str) -> Result<()> {
        let url = self.object_url(bucket, key);
        let resp = self
            .store
            .decorate(self.store.http().delete(&url), KeyRole::Anon)
            .send()
            .await
            .map_err(|e| from_reqwest(bucket, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Bucket {
                bucket: bucket.into(),
                message: format!("delete failed ({status}): {body}"),
            });
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use cf_domain::config::{StorageConfig, StoreConfig};

    fn bucket_client() -> BucketClient {
        let store = StoreClient::with_keys(
            &StoreConfig::default(),
            &StorageConfig::default(),
            Some("anon".into()),
            None,
        )
        .unwrap();
        BucketClient::new(store)
    }

    #[test]
    fn object_key_keeps_extension() {
        let key = BucketClient::object_key("product photo.PNG");
        assert!(key.ends_with(".PNG"));
        // uuid + dot + ext
        assert_eq!(key.len(), 36 + 1 + 3);
    }

    #[test]
    fn object_key_without_extension_is_bare_uuid() {
        let key = BucketClient::object_key("README");
        assert_eq!(key.len(), 36);
        assert!(!key.contains('.'));
    }

    #[test]
    fn object_keys_are_unique() {
        assert_ne!(
            BucketClient::object_key("a.png"),
            BucketClient::object_key("a.png")
        );
    }

    #[test]
    fn public_url_shape() {
        let c = bucket_client();
        assert_eq!(
            c.public_url("media", "abc.png"),
            "http://127.0.0.1:54321/storage/v1/object/public/media/abc.png"
        );
    }
}
