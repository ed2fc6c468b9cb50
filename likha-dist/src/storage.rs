#![doc = "Supabase Storage client: bridges the core StorageBackend trait to the Supabase REST API."]
//
//! # Supabase Storage client
//!
//! [`SupabaseStorage`] implements [`StorageBackend`] against the Storage REST
//! API of a Supabase project. Only the read side the resolver needs is
//! covered: listing buckets, listing the objects under a folder of a bucket,
//! and deriving the public URL of an object.
//!
//! ## Client Usage
//!
//! - Construct with [`SupabaseStorage::new`] from the project URL and anon key
//!   (injected from `SUPABASE_URL` / `SUPABASE_ANON_KEY` by `load_config`).
//! - Transport failures surface as `NetworkUnreachable`, unusable answers as
//!   `ListingFailed`; the resolver turns both into a degraded resolution.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use likha_dist_core::contract::{BucketInfo, ObjectInfo, StorageBackend};
use likha_dist_core::error::StorageError;

/// Supabase's own default page size for object listings.
const LIST_LIMIT: u32 = 100;

pub struct SupabaseStorage {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl SupabaseStorage {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let base_url = Url::parse(base_url).map_err(|e| {
            tracing::error!(error = ?e, raw = %base_url, "Failed to parse Supabase URL");
            e
        })?;
        if base_url.cannot_be_a_base() {
            return Err(format!("Supabase URL `{base_url}` cannot be used as a base URL").into());
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(SupabaseStorage {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// `base_url` with `segments` appended as percent-encoded path segments.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Option<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(segments);
        Some(url)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        what: &str,
    ) -> Result<T, StorageError> {
        let resp = self.authorized(req).send().await.map_err(|e| {
            tracing::error!(error = ?e, what, "Request to Supabase Storage failed");
            transport_error(e)
        })?;
        decode(resp, what).await
    }
}

fn transport_error(e: reqwest::Error) -> StorageError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        StorageError::NetworkUnreachable(e.to_string())
    } else {
        StorageError::ListingFailed(e.to_string())
    }
}

async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, StorageError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp
            .text()
            .await
            .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
        tracing::error!(%status, what, "Supabase Storage returned error. Response body: {body}");
        return Err(StorageError::ListingFailed(format!("{what}: HTTP {status}: {body}")));
    }
    resp.json::<T>().await.map_err(|e| {
        tracing::error!(error = ?e, what, "Failed to parse Supabase Storage response");
        StorageError::ListingFailed(format!("{what}: {e}"))
    })
}

#[async_trait]
impl StorageBackend for SupabaseStorage {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, StorageError> {
        let url = self
            .endpoint(["storage", "v1", "bucket"])
            .ok_or_else(|| StorageError::ListingFailed("invalid Supabase URL".into()))?;
        tracing::info!(url = %url, "Listing storage buckets");
        let buckets: Vec<BucketInfo> = self
            .send_json(self.client.get(url), "list buckets")
            .await?;
        tracing::info!(count = buckets.len(), "Fetched bucket list");
        Ok(buckets)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectInfo>, StorageError> {
        let url = self
            .endpoint(["storage", "v1", "object", "list", bucket])
            .ok_or_else(|| StorageError::ListingFailed("invalid Supabase URL".into()))?;
        tracing::info!(bucket, prefix, url = %url, "Listing objects in bucket");
        let body = json!({
            "prefix": prefix,
            "limit": LIST_LIMIT,
            "offset": 0,
            "sortBy": { "column": "name", "order": "asc" },
        });
        let objects: Vec<ObjectInfo> = self
            .send_json(self.client.post(url).json(&body), "list objects")
            .await?;
        tracing::info!(bucket, prefix, count = objects.len(), "Fetched object list");
        Ok(objects)
    }

    async fn public_url(&self, bucket: &str, key: &str) -> Result<String, StorageError> {
        let url_error = |reason: &str| StorageError::UrlGenerationFailed {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if key.is_empty() || key.split('/').any(str::is_empty) {
            return Err(url_error("object key has empty path segments"));
        }
        let segments = ["storage", "v1", "object", "public", bucket]
            .into_iter()
            .chain(key.split('/'));
        let url = self
            .endpoint(segments)
            .ok_or_else(|| url_error("invalid Supabase URL"))?;
        Ok(url.to_string())
    }
}
