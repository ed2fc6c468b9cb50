use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical identifier for one distributable file, independent of where it is stored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetName(String);

impl AssetName {
    pub fn new(name: impl Into<String>) -> Self {
        AssetName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetName {
    fn from(s: &str) -> Self {
        AssetName(s.to_string())
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which tier supplies the default URL of an asset when storage does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackTier {
    /// Path bundled with the static site (`/downloads/...`).
    #[default]
    Static,
    /// Release asset on the external release host, where one is published.
    Release,
}

/// External release host (GitHub Releases) serving published APKs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseHost {
    pub owner: String,
    pub repo: String,
    pub version: String,
}

impl ReleaseHost {
    /// Download URL of `file` attached to the configured release.
    pub fn asset_url(&self, file: &str) -> String {
        format!(
            "https://github.com/{}/{}/releases/download/{}/{}",
            self.owner, self.repo, self.version, file
        )
    }
}

/// Where one asset can be found: its object key in storage and its fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub name: AssetName,
    /// Object name inside the storage bucket.
    pub object_key: String,
    /// Path served by the hosting platform as-is.
    pub static_path: String,
    /// File name on the release host, if the asset is published there.
    #[serde(default)]
    pub release_file: Option<String>,
}

impl AssetSpec {
    /// Catalog entry following the `likha-<name>.apk` naming used for every grade.
    pub fn likha(name: &str) -> Self {
        let file = format!("likha-{name}.apk");
        AssetSpec {
            name: AssetName::new(name),
            static_path: format!("/downloads/{file}"),
            release_file: Some(file.clone()),
            object_key: file,
        }
    }

    /// The URL this asset falls back to when storage does not provide one.
    pub fn default_url(&self, tier: FallbackTier, release: Option<&ReleaseHost>) -> String {
        match (tier, release, self.release_file.as_deref()) {
            (FallbackTier::Release, Some(host), Some(file)) => host.asset_url(file),
            _ => self.static_path.clone(),
        }
    }
}

/// Grade levels shipped as separate APKs.
pub const LIKHA_GRADES: [&str; 4] = ["kinder", "grade1", "grade2", "grade3"];

/// The built-in catalog: one APK per grade level.
pub fn likha_catalog() -> Vec<AssetSpec> {
    LIKHA_GRADES.iter().map(|g| AssetSpec::likha(g)).collect()
}
