/// `load_config` module: Loads a static YAML config, injects storage secrets from the
/// environment, and adapts both into the core `ResolverConfig`.
///
/// This module is the only place where untrusted YAML is parsed and mapped to strongly-typed
/// internal structs. Every key is optional: an absent file section falls back to the
/// built-in Likha catalog, the `apk-files` bucket and static fallback paths.
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics, and are
/// surfaced at the CLI boundary. Missing storage secrets are not an error: they are
/// reported as `credentials: None` and the CLI degrades to default links.
use anyhow::Result;
use likha_dist_core::asset::{AssetSpec, FallbackTier, ReleaseHost};
use likha_dist_core::config::{ResolverConfig, DEFAULT_BUCKET};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

pub const URL_ENV: &str = "SUPABASE_URL";
pub const KEY_ENV: &str = "SUPABASE_ANON_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Secrets for the storage service, never read from the YAML file.
#[derive(Clone)]
pub struct StorageCredentials {
    pub url: String,
    pub api_key: String,
}

impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub struct CliConfig {
    pub resolver: ResolverConfig,
    pub timeout: Duration,
    pub credentials: Option<StorageCredentials>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    storage: StorageSection,
    #[serde(default)]
    fallback: FallbackTier,
    #[serde(default)]
    release: Option<ReleaseHost>,
    #[serde(default)]
    assets: Option<Vec<AssetSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageSection {
    #[serde(default = "default_bucket")]
    bucket: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for StorageSection {
    fn default() -> Self {
        StorageSection {
            bucket: default_bucket(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Loads the YAML config at `path` (or the built-in defaults when `None`) and
/// injects storage secrets from the environment.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let raw = match path {
        Some(path) => read_raw(path)?,
        None => {
            info!("No config file given, using built-in Likha catalog");
            RawConfig::default()
        }
    };

    if raw.storage.timeout_secs == 0 {
        error!("storage.timeout_secs is zero");
        anyhow::bail!("storage.timeout_secs must be greater than zero");
    }

    let resolver = ResolverConfig {
        bucket: raw.storage.bucket,
        fallback: raw.fallback,
        release: raw.release,
        assets: raw.assets.unwrap_or_else(|| ResolverConfig::default().assets),
    };
    if let Err(e) = resolver.validate() {
        error!(error = %e, "Invalid resolver configuration");
        anyhow::bail!("Invalid resolver configuration: {e}");
    }
    if resolver.fallback == FallbackTier::Release && resolver.release.is_none() {
        warn!("fallback is `release` but no release host is configured; static paths will be used");
    }
    resolver.trace_loaded();

    Ok(CliConfig {
        resolver,
        timeout: Duration::from_secs(raw.storage.timeout_secs),
        credentials: credentials_from_env(),
    })
}

fn read_raw(path: &Path) -> Result<RawConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let config_content = match fs::read_to_string(path) {
        Ok(content) => {
            info!(config_path = ?path, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path,
                e
            ));
        }
    };

    // An empty file is a valid "all defaults" config.
    if config_content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

fn credentials_from_env() -> Option<StorageCredentials> {
    let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());
    match (non_empty(URL_ENV), non_empty(KEY_ENV)) {
        (Some(url), Some(api_key)) => {
            info!(url = %url, "Storage credentials found in env");
            Some(StorageCredentials { url, api_key })
        }
        (url, key) => {
            warn!(
                url_set = url.is_some(),
                key_set = key.is_some(),
                "{URL_ENV} and {KEY_ENV} must both be set to query storage"
            );
            None
        }
    }
}
