//! Portable-binary wheel cache discovery.
//!
//! Wheels cached by previous runs (or by the host's package tooling) are
//! discovered by scanning cache directories for files named by the
//! `{name}-{version}-{platform suffix}` convention. No persistent index is
//! kept; the filesystem is rescanned at the start of each acquisition
//! attempt.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::Result;

/// The conventional filename for a cached wheel.
#[must_use]
pub fn wheel_file_name(name: &str, version: &str, suffix: &str) -> String {
    format!("{name}-{version}-{suffix}")
}

/// Recursively collect every `.whl` file beneath `cache_dir`, keyed by
/// filename.
///
/// A missing or unreadable cache directory yields an empty map; the caches
/// are best-effort sources, not required collaborators.
#[must_use]
pub fn scan_cached_wheels(cache_dir: &Utf8Path) -> BTreeMap<String, Utf8PathBuf> {
    let mut found = BTreeMap::new();
    if cache_dir.is_dir() {
        collect_wheels(cache_dir, &mut found);
    }
    found
}

fn collect_wheels(dir: &Utf8Path, found: &mut BTreeMap<String, Utf8PathBuf>) {
    let Ok(entries) = dir.read_dir_utf8() else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_wheels(path, found);
        } else if path.extension() == Some("whl") {
            if let Some(file_name) = path.file_name() {
                found.insert(file_name.to_owned(), path.to_owned());
            }
        }
    }
}

/// Find a cached wheel matching the conventional filename in any of the
/// given cache directories, in order.
#[must_use]
pub fn find_cached_wheel(
    cache_dirs: &[Utf8PathBuf],
    name: &str,
    version: &str,
    suffix: &str,
) -> Option<Utf8PathBuf> {
    let wanted = wheel_file_name(name, version, suffix);
    cache_dirs
        .iter()
        .find_map(|dir| scan_cached_wheels(dir).remove(&wanted))
}

/// Ensure the private wheel cache directory exists and return it.
///
/// # Errors
///
/// Returns [`crate::error::PackagerError::Io`] when the directory cannot be
/// created.
pub fn ensure_cache_dir(cache_root: &Utf8Path) -> Result<Utf8PathBuf> {
    std::fs::create_dir_all(cache_root)?;
    Ok(cache_root.to_owned())
}
