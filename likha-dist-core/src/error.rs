use thiserror::Error;

use crate::asset::AssetName;

/// Errors a storage backend can report. The resolver collapses all of them
/// into a degraded resolution; the variants only matter for diagnostics.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The designated bucket is not in the service's bucket list.
    #[error("bucket `{0}` does not exist")]
    ContainerMissing(String),

    /// The service answered, but the bucket or object listing could not be used.
    #[error("listing failed: {0}")]
    ListingFailed(String),

    #[error("public URL generation failed for `{key}`: {reason}")]
    UrlGenerationFailed { key: String, reason: String },

    /// The request never got an answer (connect error, timeout, DNS).
    #[error("storage service unreachable: {0}")]
    NetworkUnreachable(String),
}

/// Problems with a resolver configuration that would break the
/// "every asset always has a URL" guarantee.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bucket name must not be empty")]
    EmptyBucket,

    #[error("asset catalog must not be empty")]
    NoAssets,

    #[error("asset name must not be empty")]
    EmptyAssetName,

    #[error("asset `{0}` is declared more than once")]
    DuplicateAsset(AssetName),

    #[error("asset `{asset}` has an empty `{field}`")]
    EmptyField { asset: AssetName, field: &'static str },

    /// Keys are `/`-separated paths; every segment must be non-empty.
    #[error("asset `{asset}` has an invalid object_key `{key}`")]
    InvalidObjectKey { asset: AssetName, key: String },

    #[error("release host has an empty `{0}`")]
    EmptyReleaseField(&'static str),
}
