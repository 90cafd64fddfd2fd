//! Error types for the funcpack packager.
//!
//! This module defines semantic error variants for every fatal condition in
//! the packaging pipeline. Each variant names the artefact or collaborator
//! involved so failures can be diagnosed without a stack trace.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while building a deployment archive.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// A declared requirement is absent from the installed-package index.
    #[error("unresolved dependency: {name} is not present in the package index")]
    UnresolvedDependency {
        /// Canonical name of the missing distribution.
        name: String,
    },

    /// Transport or HTTP failure while talking to the package registry.
    #[error("registry request failed for {url}: {reason}")]
    Registry {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// A downloaded artifact did not match the digest published by the
    /// registry.
    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The URL the artifact was downloaded from.
        url: String,
        /// The digest published in the release metadata.
        expected: String,
        /// The digest computed from the downloaded file.
        actual: String,
    },

    /// Every acquisition strategy was exhausted for a dependency.
    #[error("unable to find suitable source for {name}=={version}")]
    NoSuitableArtifact {
        /// Canonical name of the dependency.
        name: String,
        /// Pinned version of the dependency.
        version: String,
    },

    /// The local installation of a distribution has a layout the unpacker
    /// does not understand.
    #[error("unsupported local layout for {name}: {reason}")]
    UnsupportedLocalLayout {
        /// Canonical name of the distribution.
        name: String,
        /// Description of what was found instead of a known layout.
        reason: String,
    },

    /// No ownership manifest (`top_level.txt`) could be located for a
    /// locally installed distribution.
    #[error("ownership manifest not found for {name} under {location}")]
    OwnershipManifestMissing {
        /// Canonical name of the distribution.
        name: String,
        /// The install location that was searched.
        location: Utf8PathBuf,
    },

    /// The output destination uses a remote scheme the sink does not
    /// implement.
    #[error("destination scheme {scheme}:// is not implemented")]
    RemoteDestination {
        /// The scheme portion of the destination.
        scheme: String,
    },

    /// The installed-package index file could not be read or parsed.
    #[error("invalid package index at {path}: {reason}")]
    InvalidIndex {
        /// Path to the index file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The entry-point shim file could not be read.
    #[error("invalid entry file at {path}: {reason}")]
    InvalidEntry {
        /// Path to the entry-point file.
        path: Utf8PathBuf,
        /// Description of the read failure.
        reason: String,
    },

    /// The bundled artifact store description could not be read or parsed.
    #[error("invalid artifact store at {path}: {reason}")]
    InvalidStore {
        /// Path to the store description file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// An archive entry attempts to escape the staging tree.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: String,
    },

    /// Reading or writing an archive failed.
    #[error("archive error: {reason}")]
    Archive {
        /// Description of the archive failure.
        reason: String,
    },

    /// The staging tree could not be created or populated.
    #[error("staging failed: {reason}")]
    Staging {
        /// Description of the staging failure.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for PackagerError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => PackagerError::Io(io),
            other => PackagerError::Archive {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
