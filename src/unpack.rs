//! Local distribution unpacking.
//!
//! Determines the set of top-level modules a locally installed
//! distribution owns, then copies only those into the staging tree. A
//! distribution may be laid out as a plain directory with a companion
//! ownership manifest, or as a legacy self-describing bundle (a `.egg`
//! zip carrying its manifest in an internal `EGG-INFO` folder), possibly
//! embedded inside the install directory.

use std::fs::File;
use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::error::{PackagerError, Result};
use crate::extract::read_zip_member;
use crate::ignore::IgnorePatternSet;
use crate::index::Distribution;

/// Filename of the ownership manifest listing owned top-level names.
pub const OWNERSHIP_MANIFEST: &str = "top_level.txt";

/// Manifest folder inside a legacy bundle.
const BUNDLE_MANIFEST_DIR: &str = "EGG-INFO";

/// File extension of a legacy self-describing bundle.
const BUNDLE_EXTENSION: &str = "egg";

/// Unpack whatever is installed locally for `dist` into the staging tree.
///
/// This carries no compatibility guarantee for the target runtime; it is
/// the acquisition chain's strategy of last resort, and the only way the
/// root distribution is ever installed.
///
/// # Errors
///
/// Returns [`PackagerError::UnsupportedLocalLayout`] when the install
/// location is missing or not a recognised layout, and
/// [`PackagerError::OwnershipManifestMissing`] when no manifest can be
/// located for a directory layout.
pub fn unpack_local(
    staging: &Utf8Path,
    dist: &Distribution,
    ignores: &IgnorePatternSet,
) -> Result<()> {
    let Some(location) = dist.location.as_deref() else {
        return Err(PackagerError::UnsupportedLocalLayout {
            name: dist.canonical_name(),
            reason: "no recorded install location".to_owned(),
        });
    };

    if location.is_file() {
        if location.extension() == Some(BUNDLE_EXTENSION) {
            return unpack_bundle(staging, location, dist, ignores);
        }
        return Err(PackagerError::UnsupportedLocalLayout {
            name: dist.canonical_name(),
            reason: format!("{location} is a file but not a legacy bundle"),
        });
    }
    if location.is_dir() {
        return unpack_directory(staging, location, dist, ignores);
    }
    Err(PackagerError::UnsupportedLocalLayout {
        name: dist.canonical_name(),
        reason: format!("{location} is neither a file nor a directory"),
    })
}

/// Unpack a directory-layout installation.
///
/// An embedded legacy bundle takes priority; otherwise the ownership
/// manifest is located and each owned top-level name copied verbatim.
fn unpack_directory(
    staging: &Utf8Path,
    location: &Utf8Path,
    dist: &Distribution,
    ignores: &IgnorePatternSet,
) -> Result<()> {
    let embedded = location.join(format!("{}.{BUNDLE_EXTENSION}", dist.egg_name()));
    if embedded.is_file() {
        return unpack_bundle(staging, &embedded, dist, ignores);
    }

    let manifest =
        locate_ownership_manifest(dist, location).ok_or_else(|| {
            PackagerError::OwnershipManifestMissing {
                name: dist.canonical_name(),
                location: location.to_owned(),
            }
        })?;
    let owned = read_top_level(&std::fs::read_to_string(&manifest)?);

    for top_level in owned {
        let source = location.join(&top_level);
        let destination = staging.join(&top_level);
        if source.is_dir() {
            debug!("copying {source} to {destination}");
            copy_tree(&source, &destination, ignores)?;
            continue;
        }
        // Single-file top-level module.
        let module = location.join(format!("{top_level}.py"));
        if module.is_file() {
            debug!("copying {module} into staging");
            std::fs::copy(&module, staging.join(format!("{top_level}.py")))?;
            continue;
        }
        return Err(PackagerError::UnsupportedLocalLayout {
            name: dist.canonical_name(),
            reason: format!("owned top-level {top_level} not found under {location}"),
        });
    }

    Ok(())
}

/// Locate the ownership manifest for a directory layout.
///
/// Candidate layouts are tried strictly in order; the first manifest found
/// wins:
///
/// 1. the location itself when it is an unzipped legacy bundle,
/// 2. an adjacent `{name}.egg-info` folder,
/// 3. an embedded `{egg_name}.egg/EGG-INFO` folder,
/// 4. a `{name}-{version}.dist-info` folder.
fn locate_ownership_manifest(dist: &Distribution, location: &Utf8Path) -> Option<Utf8PathBuf> {
    manifest_search_dirs(dist, location)
        .into_iter()
        .map(|dir| dir.join(OWNERSHIP_MANIFEST))
        .find(|candidate| candidate.is_file())
}

fn manifest_search_dirs(dist: &Distribution, location: &Utf8Path) -> Vec<Utf8PathBuf> {
    if location.extension() == Some(BUNDLE_EXTENSION) {
        return vec![location.join(BUNDLE_MANIFEST_DIR)];
    }
    vec![
        location.join(format!("{}.egg-info", dist.canonical_name())),
        location
            .join(format!("{}.{BUNDLE_EXTENSION}", dist.egg_name()))
            .join(BUNDLE_MANIFEST_DIR),
        location.join(format!(
            "{}-{}.dist-info",
            dist.canonical_name(),
            dist.version
        )),
    ]
}

/// Parse owned top-level names out of manifest text.
///
/// Blank lines and surrounding whitespace are discarded.
fn read_top_level(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Unpack a legacy self-describing bundle into the staging tree.
///
/// Member entries of each owned top-level name are filtered before
/// extraction: ignored paths are dropped; non-source members are always
/// kept; a source member is kept only when the bundle carries no
/// precompiled sibling for it.
fn unpack_bundle(
    staging: &Utf8Path,
    bundle_path: &Utf8Path,
    dist: &Distribution,
    ignores: &IgnorePatternSet,
) -> Result<()> {
    let file = File::open(bundle_path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    let manifest_member = format!("{BUNDLE_MANIFEST_DIR}/{OWNERSHIP_MANIFEST}");
    let manifest = match read_zip_member(&mut archive, &manifest_member) {
        Ok(data) => data,
        Err(PackagerError::Archive { .. }) => {
            return Err(PackagerError::OwnershipManifestMissing {
                name: dist.canonical_name(),
                location: bundle_path.to_owned(),
            });
        }
        Err(other) => return Err(other),
    };
    let owned = read_top_level(&String::from_utf8_lossy(&manifest));

    let all_names: Vec<String> = archive.file_names().map(str::to_owned).collect();
    for top_level in owned {
        let prefix = format!("{top_level}/");
        let members: Vec<&str> = all_names
            .iter()
            .map(String::as_str)
            .filter(|name| name.starts_with(&prefix))
            .collect();

        for member in &members {
            if ignores.is_ignored_entry(member) {
                continue;
            }
            if !keep_bundle_member(member, &members) {
                continue;
            }
            debug!("extracting bundle member {member}");
            extract_member(&mut archive, member, staging)?;
        }
    }

    Ok(())
}

/// Whether a bundle member survives the source-versus-compiled filter.
///
/// Non-source members always do; a `.py` member only when no `.pyc`
/// sibling exists among the bundle's members.
fn keep_bundle_member(member: &str, members: &[&str]) -> bool {
    if !member.ends_with(".py") {
        return true;
    }
    let compiled_sibling = format!("{member}c");
    !members.iter().any(|&m| m == compiled_sibling)
}

/// Extract one named member of a bundle to its relative path beneath
/// `staging`.
fn extract_member(
    archive: &mut zip::ZipArchive<BufReader<File>>,
    member: &str,
    staging: &Utf8Path,
) -> Result<()> {
    let mut entry = archive.by_name(member)?;
    if entry.is_dir() {
        return Ok(());
    }
    let Some(entry_path) = entry.enclosed_name() else {
        return Err(PackagerError::PathTraversal {
            path: member.to_owned(),
        });
    };
    let dest_path = staging.as_std_path().join(entry_path);
    if let Some(parent) = dest_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = File::create(&dest_path)?;
    std::io::copy(&mut entry, &mut out)?;
    Ok(())
}

/// Recursively copy a directory tree, skipping ignored entries.
pub(crate) fn copy_tree(
    src: &Utf8Path,
    dest: &Utf8Path,
    ignores: &IgnorePatternSet,
) -> Result<()> {
    std::fs::create_dir_all(dest)?;
    for entry in src.read_dir_utf8()? {
        let entry = entry?;
        let name = entry.file_name();
        if ignores.is_ignored(Utf8Path::new(name)) {
            continue;
        }
        let destination = dest.join(name);
        if entry.file_type()?.is_dir() {
            copy_tree(entry.path(), &destination, ignores)?;
        } else {
            std::fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "unpack_tests.rs"]
mod tests;
