//! Bundled artifact store.
//!
//! The store is a read-only, pre-populated mapping from (name, runtime) to
//! a precompiled artifact archive known to be binary-compatible with the
//! target runtime. It is described by a TOML document of `[[artifact]]`
//! tables and queried with an explicit version-match policy shared by the
//! strict and version-relaxed acquisition strategies.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::error::{PackagerError, Result};
use crate::index::canonicalize;
use crate::runtime::Runtime;

/// Metadata describing one precompiled artifact in the bundled store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactRecord {
    /// Distribution name the artifact provides.
    pub name: String,
    /// Target runtime the artifact was compiled for.
    pub runtime: String,
    /// Version of the distribution inside the artifact.
    pub version: String,
    /// Path to the artifact archive (a `.tar.gz`).
    pub path: Utf8PathBuf,
}

/// Version-match policy for store lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMatch<'a> {
    /// Only an artifact at exactly this version is acceptable.
    Exact(&'a str),
    /// Any version for the platform/runtime is acceptable.
    Any,
}

#[derive(Debug, Deserialize)]
struct StoreFile {
    #[serde(default)]
    artifact: Vec<ArtifactRecord>,
}

/// The bundled, version-pinned artifact store.
#[derive(Debug, Clone, Default)]
pub struct BundledStore {
    records: Vec<ArtifactRecord>,
}

impl BundledStore {
    /// An empty store; every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the store description from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::InvalidStore`] when the file cannot be read
    /// or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PackagerError::InvalidStore {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let file: StoreFile = toml::from_str(&text).map_err(|e| PackagerError::InvalidStore {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            records: file.artifact,
        })
    }

    /// Build a store from records already in memory.
    #[must_use]
    pub fn from_records(records: Vec<ArtifactRecord>) -> Self {
        Self { records }
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up an artifact by name and runtime under the given
    /// version-match policy.
    ///
    /// Names are compared case-insensitively. The first matching record in
    /// store order wins.
    #[must_use]
    pub fn lookup(
        &self,
        name: &str,
        runtime: &Runtime,
        version: VersionMatch<'_>,
    ) -> Option<&ArtifactRecord> {
        let canonical = canonicalize(name);
        self.records.iter().find(|record| {
            canonicalize(&record.name) == canonical
                && record.runtime == runtime.as_str()
                && match version {
                    VersionMatch::Exact(v) => record.version == v,
                    VersionMatch::Any => true,
                }
        })
    }
}
