//! Download-link resolution: storage first, configured defaults otherwise.
//!
//! A pass starts from [`ResolverConfig::default_links`], checks that the
//! configured bucket exists, lists every folder that holds an asset object
//! and asks the backend for a public URL for every asset whose object is
//! present. Assets without an
//! object keep their default. Any backend error turns the whole pass into a
//! degraded resolution carrying the untouched defaults; nothing is retried.
//!
//! # Navigation
//! - Main entrypoint: [`resolve`]
//! - Error-propagating variant: [`try_resolve`]

use futures::future::try_join_all;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{error, info, warn};

use crate::asset::AssetSpec;
use crate::config::ResolverConfig;
use crate::contract::StorageBackend;
use crate::error::StorageError;
use crate::links::{DownloadLinkSet, Resolution};

/// Runs one resolution pass. Never fails: backend errors yield a degraded
/// resolution with the default link set.
pub async fn resolve<S>(config: &ResolverConfig, storage: &S) -> Resolution
where
    S: StorageBackend + ?Sized,
{
    info!(bucket = %config.bucket, "[RESOLVE] Starting download link resolution");
    match try_resolve(config, storage).await {
        Ok(links) => {
            let from_storage = links.differing_from(&config.default_links()).len();
            info!(
                bucket = %config.bucket,
                from_storage,
                total = links.len(),
                "[RESOLVE] Resolution complete"
            );
            Resolution::resolved(links)
        }
        Err(e) => {
            error!(bucket = %config.bucket, error = %e, "[RESOLVE][ERROR] Falling back to default links");
            Resolution::degraded(config.default_links())
        }
    }
}

/// Like [`resolve`], but hands the backend error to the caller instead of degrading.
pub async fn try_resolve<S>(
    config: &ResolverConfig,
    storage: &S,
) -> Result<DownloadLinkSet, StorageError>
where
    S: StorageBackend + ?Sized,
{
    let mut links = config.default_links();

    let buckets = storage.list_buckets().await?;
    if !buckets.iter().any(|b| b.name == config.bucket) {
        return Err(StorageError::ContainerMissing(config.bucket.clone()));
    }

    // Listings are not recursive, so each folder holding an asset is listed on its own.
    let folders: BTreeSet<&str> = config
        .assets
        .iter()
        .map(|a| split_key(&a.object_key).0)
        .collect();
    let listings = try_join_all(folders.into_iter().map(|folder| async move {
        let objects = storage.list_objects(&config.bucket, folder).await?;
        let names: HashSet<String> = objects.into_iter().map(|o| o.name).collect();
        Ok::<_, StorageError>((folder, names))
    }))
    .await?;
    let present: HashMap<&str, HashSet<String>> = listings.into_iter().collect();

    let mut lookups: Vec<&AssetSpec> = Vec::new();
    for asset in &config.assets {
        let (folder, file) = split_key(&asset.object_key);
        if present.get(folder).is_some_and(|names| names.contains(file)) {
            lookups.push(asset);
        } else {
            warn!(
                asset = %asset.name,
                object_key = %asset.object_key,
                "[RESOLVE] Object not found in bucket, keeping default"
            );
        }
    }

    // Entries are independent, so lookup order does not matter.
    let urls = try_join_all(lookups.into_iter().map(|asset| async move {
        let url = storage.public_url(&config.bucket, &asset.object_key).await?;
        Ok::<_, StorageError>((asset, url))
    }))
    .await?;

    for (asset, url) in urls {
        if url.trim().is_empty() {
            warn!(asset = %asset.name, "[RESOLVE] Storage returned an empty public URL, keeping default");
            continue;
        }
        info!(asset = %asset.name, url = %url, "[RESOLVE] Using storage URL");
        links.insert(asset.name.clone(), url);
    }

    Ok(links)
}

/// Splits an object key into its folder (`""` at the root) and file name.
fn split_key(key: &str) -> (&str, &str) {
    key.rsplit_once('/').unwrap_or(("", key))
}
