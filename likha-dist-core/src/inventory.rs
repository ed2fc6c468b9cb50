//! Read-only listing of what a bucket holds, with the public URL of each object.
//!
//! This is the operator's view of the objects the resolver can pick up. Only
//! the bucket root is listed; folder placeholders are skipped.

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::contract::StorageBackend;
use crate::error::StorageError;

/// An object in the bucket together with its public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub name: String,
    pub url: String,
}

/// Lists the objects at the root of `bucket` and looks up their public URLs.
///
/// Unlike [`crate::resolver::resolve`] this does not degrade: any backend
/// error is returned to the caller.
pub async fn list_inventory<S>(
    storage: &S,
    bucket: &str,
) -> Result<Vec<StoredObject>, StorageError>
where
    S: StorageBackend + ?Sized,
{
    info!(bucket, "[INVENTORY] Listing bucket contents");

    let buckets = storage.list_buckets().await?;
    if !buckets.iter().any(|b| b.name == bucket) {
        return Err(StorageError::ContainerMissing(bucket.to_string()));
    }

    let objects = storage.list_objects(bucket, "").await?;
    let files: Vec<String> = objects
        .into_iter()
        .filter_map(|o| match o.id {
            Some(_) => Some(o.name),
            None => {
                debug!(name = %o.name, "[INVENTORY] Skipping folder placeholder");
                None
            }
        })
        .collect();

    let inventory = try_join_all(files.into_iter().map(|name| async move {
        let url = storage.public_url(bucket, &name).await?;
        Ok::<_, StorageError>(StoredObject { name, url })
    }))
    .await?;

    info!(bucket, count = inventory.len(), "[INVENTORY] Listing complete");
    Ok(inventory)
}
