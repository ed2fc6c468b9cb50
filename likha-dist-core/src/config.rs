use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::asset::{likha_catalog, AssetSpec, FallbackTier, ReleaseHost};
use crate::error::ConfigError;
use crate::links::DownloadLinkSet;

pub const DEFAULT_BUCKET: &str = "apk-files";

/// Everything the resolver needs: where to look and what to fall back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub bucket: String,
    pub fallback: FallbackTier,
    pub release: Option<ReleaseHost>,
    pub assets: Vec<AssetSpec>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            bucket: DEFAULT_BUCKET.to_string(),
            fallback: FallbackTier::Static,
            release: None,
            assets: likha_catalog(),
        }
    }
}

impl ResolverConfig {
    /// The link set shown before (or instead of) anything resolved from storage.
    pub fn default_links(&self) -> DownloadLinkSet {
        self.assets
            .iter()
            .map(|a| (a.name.clone(), a.default_url(self.fallback, self.release.as_ref())))
            .collect()
    }

    /// Checks that every asset is uniquely named and always has a usable default URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::EmptyBucket);
        }
        if self.assets.is_empty() {
            return Err(ConfigError::NoAssets);
        }
        if let Some(release) = &self.release {
            for (field, value) in [
                ("owner", &release.owner),
                ("repo", &release.repo),
                ("version", &release.version),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::EmptyReleaseField(field));
                }
            }
        }
        let mut seen = HashSet::new();
        for asset in &self.assets {
            if asset.name.as_str().trim().is_empty() {
                return Err(ConfigError::EmptyAssetName);
            }
            if !seen.insert(&asset.name) {
                return Err(ConfigError::DuplicateAsset(asset.name.clone()));
            }
            if asset.object_key.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    asset: asset.name.clone(),
                    field: "object_key",
                });
            }
            if asset.object_key.split('/').any(|segment| segment.trim().is_empty()) {
                return Err(ConfigError::InvalidObjectKey {
                    asset: asset.name.clone(),
                    key: asset.object_key.clone(),
                });
            }
            if asset.static_path.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    asset: asset.name.clone(),
                    field: "static_path",
                });
            }
            if asset.release_file.as_deref().is_some_and(|f| f.trim().is_empty()) {
                return Err(ConfigError::EmptyField {
                    asset: asset.name.clone(),
                    field: "release_file",
                });
            }
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            bucket = %self.bucket,
            fallback = ?self.fallback,
            release_host = self.release.is_some(),
            assets_count = self.assets.len(),
            "Loaded ResolverConfig"
        );
        debug!(?self, "ResolverConfig loaded (full debug)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetName;

    #[test]
    fn default_links_use_static_paths() {
        let links = ResolverConfig::default().default_links();
        assert_eq!(links.len(), 4);
        assert_eq!(
            links.get(&AssetName::from("grade3")),
            Some("/downloads/likha-grade3.apk")
        );
    }

    #[test]
    fn release_fallback_only_applies_with_a_release_host() {
        let mut config = ResolverConfig {
            fallback: FallbackTier::Release,
            ..ResolverConfig::default()
        };
        assert_eq!(
            config.default_links().get(&AssetName::from("kinder")),
            Some("/downloads/likha-kinder.apk")
        );

        config.release = Some(ReleaseHost {
            owner: "likha-app".into(),
            repo: "likha".into(),
            version: "v1.0.0".into(),
        });
        config.assets[1].release_file = None;
        let links = config.default_links();
        assert_eq!(
            links.get(&AssetName::from("kinder")),
            Some("https://github.com/likha-app/likha/releases/download/v1.0.0/likha-kinder.apk")
        );
        assert_eq!(
            links.get(&AssetName::from("grade1")),
            Some("/downloads/likha-grade1.apk")
        );
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ResolverConfig::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_duplicates_and_empty_fields() {
        let mut config = ResolverConfig::default();
        config.assets.push(AssetSpec::likha("kinder"));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateAsset(AssetName::from("kinder")))
        );

        let mut config = ResolverConfig::default();
        config.assets[2].static_path = "  ".into();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyField {
                asset: AssetName::from("grade2"),
                field: "static_path",
            })
        );

        let config = ResolverConfig {
            bucket: String::new(),
            ..ResolverConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyBucket));

        let config = ResolverConfig {
            assets: vec![],
            ..ResolverConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoAssets));
    }

    #[test]
    fn validate_accepts_nested_keys_but_not_empty_segments() {
        let mut config = ResolverConfig::default();
        config.assets[0].object_key = "builds/likha-kinder.apk".into();
        assert_eq!(config.validate(), Ok(()));

        for key in ["/likha-kinder.apk", "builds//likha-kinder.apk", "builds/"] {
            config.assets[0].object_key = key.into();
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidObjectKey {
                    asset: AssetName::from("kinder"),
                    key: key.into(),
                })
            );
        }
    }

    #[test]
    fn validate_rejects_incomplete_release_host() {
        let mut config = ResolverConfig {
            fallback: FallbackTier::Release,
            release: Some(ReleaseHost {
                owner: "likha-app".into(),
                repo: "likha".into(),
                version: "v1.0.0".into(),
            }),
            ..ResolverConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));

        if let Some(release) = config.release.as_mut() {
            release.repo = String::new();
        }
        assert_eq!(config.validate(), Err(ConfigError::EmptyReleaseField("repo")));

        if let Some(release) = config.release.as_mut() {
            release.repo = "likha".into();
            release.version = " ".into();
        }
        assert_eq!(config.validate(), Err(ConfigError::EmptyReleaseField("version")));
    }
}
