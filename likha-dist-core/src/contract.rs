//! # contract: storage interface the resolver depends on
//!
//! The resolver only needs three questions answered by the storage service:
//! which buckets exist, which objects a bucket holds, and what the public URL
//! of an object is. [`StorageBackend`] captures exactly that, so the resolver
//! can run against the Supabase REST client in production and against
//! `mockall` mocks in tests.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockStorageBackend` is exported
//!   under the `test-export-mocks` feature (on by default).
//!
//! ## Adding New Storage Services
//! - Implement the trait for the service.
//! - Map transport failures to [`StorageError::NetworkUnreachable`] and
//!   unusable answers to [`StorageError::ListingFailed`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::StorageError;

/// A bucket as reported by the storage service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub public: bool,
}

/// An object listed inside a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub name: String,
    /// Absent for folder placeholders.
    #[serde(default)]
    pub id: Option<String>,
}

impl ObjectInfo {
    pub fn named(name: impl Into<String>) -> Self {
        ObjectInfo {
            name: name.into(),
            id: None,
        }
    }
}

/// Read-only view of an object storage service.
///
/// The trait is `Send` + `Sync` and intended for async/await usage; the
/// resolver holds it behind a shared reference or an `Arc`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// List every bucket visible with the configured credentials.
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>, StorageError>;

    /// List the entries directly under `prefix` in `bucket` (`""` is the root).
    /// Names are relative to `prefix`; sub-folders show up as placeholders.
    async fn list_objects(&self, bucket: &str, prefix: &str)
        -> Result<Vec<ObjectInfo>, StorageError>;

    /// Durable, unauthenticated URL for `key` in `bucket`.
    async fn public_url(&self, bucket: &str, key: &str) -> Result<String, StorageError>;
}
