use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Stable identifier of an installed plugin, e.g. `akismet/akismet.php`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Registry slug for this plugin
    ///
    /// The slug is the name of the directory holding the plugin's main file.
    /// Single-file plugins living directly in the plugins root have no
    /// directory, so we fall back to the file stem (`hello.php` -> `hello`).
    pub fn slug(&self) -> String {
        let mut parts = self.0.rsplit(['/', '\\']).filter(|p| !p.is_empty());
        let file = parts.next().unwrap_or_default();

        match parts.next() {
            Some(dir) => dir.to_string(),
            None => file
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .filter(|stem| !stem.is_empty())
                .unwrap_or(file)
                .to_string(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PackageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the host knows about an installed plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Human-readable plugin name
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    /// Custom update endpoint declared by the plugin header
    #[serde(default)]
    pub update_uri: Option<String>,
}

impl PackageMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_update_uri(mut self, uri: impl Into<String>) -> Self {
        self.update_uri = Some(uri.into());
        self
    }

    /// Plugins with their own update URI are not the registry's business
    pub fn is_self_managed(&self) -> bool {
        self.update_uri
            .as_deref()
            .is_some_and(|uri| !uri.trim().is_empty())
    }
}

/// Closed plugins and the notice the registry shows for each
pub type ClosedSet = BTreeMap<PackageId, String>;

/// The single persisted record of the last closed-status pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(default)]
    pub closed: ClosedSet,

    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
}

impl StatusRecord {
    pub fn new(closed: ClosedSet, last_checked: DateTime<Utc>) -> Self {
        Self {
            closed,
            last_checked: Some(last_checked),
        }
    }

    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// Notice for a plugin, empty notices count as "not closed"
    pub fn notice(&self, id: &PackageId) -> Option<&str> {
        self.closed
            .get(id)
            .map(String::as_str)
            .filter(|notice| !notice.is_empty())
    }
}

/// Result of the host's ordinary update check
///
/// Both sets are keyed by plugin identifier. Anything listed in either one is
/// alive and well as far as the registry is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    /// Plugins with an update available
    #[serde(default)]
    pub response: BTreeSet<PackageId>,

    /// Plugins that are up to date
    #[serde(default)]
    pub no_update: BTreeSet<PackageId>,

    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,
}

impl UpdateStatus {
    /// Union of `response` and `no_update`
    pub fn live_set(&self) -> BTreeSet<PackageId> {
        self.response.union(&self.no_update).cloned().collect()
    }
}
