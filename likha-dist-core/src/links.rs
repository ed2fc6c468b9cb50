use serde::Serialize;
use std::collections::BTreeMap;

use crate::asset::AssetName;

/// Resolved download URL per asset. Rebuilt from scratch on every
/// resolution pass; never merged with a previous set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DownloadLinkSet {
    links: BTreeMap<AssetName, String>,
}

impl DownloadLinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &AssetName) -> Option<&str> {
        self.links.get(name).map(String::as_str)
    }

    /// Sets the URL for `name`, returning the URL it replaced.
    pub fn insert(&mut self, name: AssetName, url: impl Into<String>) -> Option<String> {
        self.links.insert(name, url.into())
    }

    pub fn contains(&self, name: &AssetName) -> bool {
        self.links.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetName, &str)> {
        self.links.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Assets whose URL differs from `other` (or is missing there).
    pub fn differing_from<'a>(&'a self, other: &DownloadLinkSet) -> Vec<&'a AssetName> {
        self.links
            .iter()
            .filter(|(name, url)| other.links.get(*name) != Some(*url))
            .map(|(name, _)| name)
            .collect()
    }
}

impl FromIterator<(AssetName, String)> for DownloadLinkSet {
    fn from_iter<I: IntoIterator<Item = (AssetName, String)>>(iter: I) -> Self {
        DownloadLinkSet {
            links: iter.into_iter().collect(),
        }
    }
}

/// Progress of a resolution pass. `Pending` moves to exactly one of the
/// terminal states and stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Pending,
    Resolved,
    Degraded,
}

impl ResolutionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ResolutionStatus::Pending)
    }
}

pub const FALLBACK_NOTICE: &str = "Using fallback download links";

/// A published snapshot: the links a consumer should show right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub status: ResolutionStatus,
    pub links: DownloadLinkSet,
}

impl Resolution {
    pub fn pending(defaults: DownloadLinkSet) -> Self {
        Resolution {
            status: ResolutionStatus::Pending,
            links: defaults,
        }
    }

    pub fn resolved(links: DownloadLinkSet) -> Self {
        Resolution {
            status: ResolutionStatus::Resolved,
            links,
        }
    }

    pub fn degraded(defaults: DownloadLinkSet) -> Self {
        Resolution {
            status: ResolutionStatus::Degraded,
            links: defaults,
        }
    }

    /// User-facing notice, only shown when storage could not be used.
    pub fn notice(&self) -> Option<&'static str> {
        match self.status {
            ResolutionStatus::Degraded => Some(FALLBACK_NOTICE),
            _ => None,
        }
    }
}
