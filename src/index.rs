//! Installed-package index access.
//!
//! The index is an external collaborator: given a canonical name it returns
//! the [`Distribution`] registered under that name, or signals absence. The
//! production implementation reads a JSON document describing the host's
//! installed distributions; tests construct indexes in memory.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::error::{PackagerError, Result};

/// A resolved, installed distribution.
///
/// Identity is `(name, version)`. Instances are immutable once read from
/// the index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Distribution {
    /// Distribution name as recorded by the index.
    pub name: String,
    /// Pinned version string.
    pub version: String,
    /// Install location on disk, when known. May point at a directory
    /// layout or a legacy single-file bundle.
    #[serde(default)]
    pub location: Option<Utf8PathBuf>,
    /// Names of distributions this one declares as requirements.
    #[serde(default)]
    pub requires: Vec<String>,
}

impl Distribution {
    /// The case-folded name used as the identity key.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        canonicalize(&self.name)
    }

    /// The basename (without extension) a legacy bundle of this
    /// distribution carries: name and version with hyphens folded to
    /// underscores, joined by a hyphen.
    #[must_use]
    pub fn egg_name(&self) -> String {
        format!(
            "{}-{}",
            self.name.replace('-', "_"),
            self.version.replace('-', "_")
        )
    }
}

/// Fold a distribution name to its canonical, case-insensitive key.
#[must_use]
pub fn canonicalize(name: &str) -> String {
    name.to_lowercase()
}

/// Query interface over the host's installed-package index.
#[cfg_attr(test, mockall::automock)]
pub trait PackageIndex {
    /// Look up the distribution registered under `name`, case-insensitively.
    fn lookup(&self, name: &str) -> Option<Distribution>;
}

/// Package index backed by a JSON document.
///
/// The document is a JSON array of distribution records:
///
/// ```json
/// [{"name": "requests", "version": "2.18.4",
///   "location": "/opt/site-packages", "requires": ["urllib3"]}]
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileIndex {
    by_name: BTreeMap<String, Distribution>,
}

impl JsonFileIndex {
    /// Load the index from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidIndex`] when the file cannot be read
    /// or does not parse as a distribution list.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PackagerError::InvalidIndex {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let records: Vec<Distribution> =
            serde_json::from_str(&text).map_err(|e| PackagerError::InvalidIndex {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self::from_distributions(records))
    }

    /// Build an index from already-parsed distribution records.
    ///
    /// Later records win when two share a canonical name.
    #[must_use]
    pub fn from_distributions(records: Vec<Distribution>) -> Self {
        let by_name = records
            .into_iter()
            .map(|d| (d.canonical_name(), d))
            .collect();
        Self { by_name }
    }
}

impl PackageIndex for JsonFileIndex {
    fn lookup(&self, name: &str) -> Option<Distribution> {
        self.by_name.get(&canonicalize(name)).cloned()
    }
}
