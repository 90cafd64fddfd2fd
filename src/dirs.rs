//! Directory resolution abstraction for platform-specific paths.
//!
//! The wheel cache the host's package tooling maintains lives in a
//! platform-specific location; the trait boundary lets tests inject fixed
//! paths instead of the real user directories.

use std::path::PathBuf;

use camino::Utf8PathBuf;

/// Resolves platform-specific base directories.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// The host package tooling's wheel cache directory, when the platform
    /// provides a user cache location.
    fn wheel_cache_dir(&self) -> Option<PathBuf>;
}

/// Production implementation backed by the platform's user directories.
#[derive(Debug, Clone, Copy)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn wheel_cache_dir(&self) -> Option<PathBuf> {
        directories_next::BaseDirs::new().map(|dirs| dirs.cache_dir().join("pip"))
    }
}

/// The default private cache root for downloaded artifacts.
///
/// Lives under the system temporary directory so independent runs share
/// downloads; concurrent writers of the same entry race last-writer-wins.
///
/// Returns `None` when the temporary directory is not valid UTF-8.
#[must_use]
pub fn default_cache_root() -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(std::env::temp_dir())
        .ok()
        .map(|dir| dir.join("funcpack-cache"))
}
