//! Output sink for the finished archive.
//!
//! Accepts a local filesystem path with copy semantics. Remote destination
//! schemes are a named, explicitly unimplemented capability, not a silent
//! no-op.

use camino::Utf8Path;

use crate::error::{PackagerError, Result};

/// Write the finished archive to `destination`.
///
/// # Errors
///
/// Returns [`PackagerError::RemoteDestination`] for scheme-prefixed
/// destinations and [`PackagerError::Io`] when the local copy fails.
pub fn output_bundle(archive_path: &Utf8Path, destination: &str) -> Result<()> {
    if let Some((scheme, _)) = destination.split_once("://") {
        return Err(PackagerError::RemoteDestination {
            scheme: scheme.to_owned(),
        });
    }
    std::fs::copy(archive_path, destination)?;
    Ok(())
}
