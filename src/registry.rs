//! Public package registry client.
//!
//! Fetches release metadata (`GET {base}/{name}/json`) and downloads wheel
//! artifacts. The trait boundary allows tests to mock network behaviour;
//! the production implementation uses a shared `ureq` agent with a global
//! timeout. A transport-level failure is fatal for the run; only a missing
//! version or artifact URL is treated as a cache-style miss by callers.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

use camino::Utf8Path;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::{PackagerError, Result};

/// The default release-metadata endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://pypi.python.org/pypi";

/// Network timeout for metadata requests and artifact downloads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Digests published alongside a release artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArtifactDigests {
    /// Hex-encoded SHA-256 digest, when the registry publishes one.
    #[serde(default)]
    pub sha256: Option<String>,
}

/// One downloadable artifact of a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseArtifact {
    /// Download URL for the artifact.
    pub url: String,
    /// Published digests for the artifact.
    #[serde(default)]
    pub digests: ArtifactDigests,
}

/// Release metadata for one distribution name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseDoc {
    /// Artifacts listed per released version.
    #[serde(default)]
    pub releases: BTreeMap<String, Vec<ReleaseArtifact>>,
}

impl ReleaseDoc {
    /// Find the first listed artifact of `version` whose URL ends with the
    /// platform-tag `suffix`.
    ///
    /// The registry's listing order is unspecified upstream; "first match"
    /// is the documented tie-break, not a significance claim.
    #[must_use]
    pub fn find_artifact(&self, version: &str, suffix: &str) -> Option<&ReleaseArtifact> {
        self.releases
            .get(version)?
            .iter()
            .find(|artifact| artifact.url.ends_with(suffix))
    }
}

/// Query interface over the public package registry.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseIndex {
    /// Fetch the release metadata document for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Registry`] on any transport or HTTP-status
    /// failure, including 404; an unknown name is a registry fault, not a
    /// cache miss.
    fn release_metadata(&self, name: &str) -> Result<ReleaseDoc>;

    /// Download `url` into the file at `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Registry`] on transport failure and
    /// [`PackagerError::Io`] when the destination cannot be written.
    fn download(&self, url: &str, dest: &Utf8Path) -> Result<()>;
}

/// HTTP registry client using `ureq`.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    base_url: String,
}

impl HttpRegistry {
    /// Create a client against the given metadata endpoint base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// The metadata URL for a distribution name.
    #[must_use]
    pub fn metadata_url(&self, name: &str) -> String {
        format!("{}/{name}/json", self.base_url)
    }
}

impl Default for HttpRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

impl ReleaseIndex for HttpRegistry {
    fn release_metadata(&self, name: &str) -> Result<ReleaseDoc> {
        let url = self.metadata_url(name);
        let response = http_agent()
            .get(&url)
            .call()
            .map_err(|e| registry_error(&url, &e))?;
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| PackagerError::Registry {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        serde_json::from_str(&body).map_err(|e| PackagerError::Registry {
            url,
            reason: format!("malformed release metadata: {e}"),
        })
    }

    fn download(&self, url: &str, dest: &Utf8Path) -> Result<()> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| registry_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)?;
        Ok(())
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to the fatal [`PackagerError::Registry`] variant.
fn registry_error(url: &str, err: &ureq::Error) -> PackagerError {
    PackagerError::Registry {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}

/// Compute the lowercase hex SHA-256 digest of a file.
///
/// # Errors
///
/// Returns [`PackagerError::Io`] when the file cannot be read.
pub fn compute_sha256(path: &Utf8Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(version: &str, urls: &[&str]) -> ReleaseDoc {
        let artifacts = urls
            .iter()
            .map(|&url| ReleaseArtifact {
                url: url.to_owned(),
                digests: ArtifactDigests::default(),
            })
            .collect();
        let mut releases = BTreeMap::new();
        releases.insert(version.to_owned(), artifacts);
        ReleaseDoc { releases }
    }

    #[test]
    fn metadata_url_appends_name_and_json() {
        let registry = HttpRegistry::new("https://pypi.python.org/pypi/");
        assert_eq!(
            registry.metadata_url("requests"),
            "https://pypi.python.org/pypi/requests/json"
        );
    }

    #[test]
    fn find_artifact_matches_platform_suffix() {
        let doc = doc_with(
            "4.1.1",
            &[
                "https://files.example/lxml-4.1.1.tar.gz",
                "https://files.example/lxml-4.1.1-cp36m-manylinux1_x86_64.whl",
            ],
        );
        let found = doc
            .find_artifact("4.1.1", "cp36m-manylinux1_x86_64.whl")
            .expect("wheel artifact");
        assert!(found.url.ends_with(".whl"));
    }

    #[test]
    fn find_artifact_takes_first_listed_match() {
        let doc = doc_with(
            "4.1.1",
            &[
                "https://a.example/lxml-4.1.1-cp36m-manylinux1_x86_64.whl",
                "https://b.example/lxml-4.1.1-cp36m-manylinux1_x86_64.whl",
            ],
        );
        let found = doc
            .find_artifact("4.1.1", "cp36m-manylinux1_x86_64.whl")
            .expect("wheel artifact");
        assert!(found.url.starts_with("https://a.example/"));
    }

    #[test]
    fn find_artifact_missing_version_is_none() {
        let doc = doc_with("4.1.1", &["https://files.example/lxml-4.1.1.whl"]);
        assert!(doc.find_artifact("9.9.9", ".whl").is_none());
    }

    #[test]
    fn release_doc_parses_registry_metadata_shape() {
        let json = r#"{
            "info": {"name": "lxml"},
            "releases": {
                "4.1.1": [
                    {"url": "https://files.example/lxml-4.1.1-cp36m-manylinux1_x86_64.whl",
                     "digests": {"sha256": "abc123", "md5": "ignored"}}
                ]
            }
        }"#;
        let doc: ReleaseDoc = serde_json::from_str(json).expect("parse metadata");
        let artifact = doc
            .find_artifact("4.1.1", "cp36m-manylinux1_x86_64.whl")
            .expect("artifact");
        assert_eq!(artifact.digests.sha256.as_deref(), Some("abc123"));
    }

    #[test]
    fn compute_sha256_of_known_content() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("data");
        std::fs::write(&path, b"hello world").expect("write data");
        let utf8 = Utf8Path::from_path(&path).expect("utf8 path");

        let digest = compute_sha256(utf8).expect("digest");
        assert_eq!(
            digest,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }
}
