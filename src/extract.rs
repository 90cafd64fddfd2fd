//! Archive extraction into the staging tree.
//!
//! Handles the two artifact container formats the acquisition chain
//! produces: gzip-compressed tar archives from the bundled store and zip
//! wheels from the caches and the registry. Every entry path is validated
//! against path traversal and filtered through the ignore set before it is
//! written beneath the destination.

use std::io::{BufReader, Read};
use std::path::{Component, Path};

use camino::Utf8Path;

use crate::error::{PackagerError, Result};
use crate::ignore::IgnorePatternSet;

/// Validate that an archive entry path cannot escape the destination
/// directory via `..` components or an absolute path.
///
/// # Errors
///
/// Returns [`PackagerError::PathTraversal`] for offending paths.
pub fn validate_entry_path(path: &Path) -> Result<()> {
    if path.is_absolute() {
        return Err(PackagerError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(PackagerError::PathTraversal {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}

/// Extract a gzip-compressed tar archive beneath `dest`.
///
/// Ignored entries are skipped; all other entries keep their
/// archive-internal relative paths.
///
/// # Errors
///
/// Returns [`PackagerError::PathTraversal`] for escaping entries and
/// [`PackagerError::Io`] on read or write failures.
pub fn extract_tar_gz(archive_path: &Utf8Path, dest: &Utf8Path, ignores: &IgnorePatternSet) -> Result<()> {
    let file = std::fs::File::open(archive_path)?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();

        validate_entry_path(&entry_path)?;
        if is_ignored_std_path(&entry_path, ignores) {
            continue;
        }

        let dest_path = dest.as_std_path().join(&entry_path);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&dest_path)?;
    }

    Ok(())
}

/// Extract a zip archive (a wheel) beneath `dest`.
///
/// Directory entries and ignored entries are skipped; file entries keep
/// their archive-internal relative paths.
///
/// # Errors
///
/// Returns [`PackagerError::PathTraversal`] for entries without a safe
/// enclosed name, [`PackagerError::Archive`] for malformed archives, and
/// [`PackagerError::Io`] on read or write failures.
pub fn extract_zip(archive_path: &Utf8Path, dest: &Utf8Path, ignores: &IgnorePatternSet) -> Result<()> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if ignores.is_ignored_entry(entry.name()) {
            continue;
        }
        let Some(entry_path) = entry.enclosed_name() else {
            return Err(PackagerError::PathTraversal {
                path: entry.name().to_owned(),
            });
        };
        if entry.is_dir() {
            continue;
        }

        let dest_path = dest.as_std_path().join(entry_path);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&dest_path)?;
        std::io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

/// Read one named member of a zip archive into a byte buffer.
///
/// # Errors
///
/// Returns [`PackagerError::Archive`] when the member is absent or the
/// archive is malformed, [`PackagerError::Io`] on read failures.
pub fn read_zip_member(
    archive: &mut zip::ZipArchive<BufReader<std::fs::File>>,
    name: &str,
) -> Result<Vec<u8>> {
    let mut member = archive.by_name(name)?;
    let mut data = Vec::new();
    member.read_to_end(&mut data)?;
    Ok(data)
}

fn is_ignored_std_path(path: &Path, ignores: &IgnorePatternSet) -> bool {
    Utf8Path::from_path(path).is_some_and(|p| ignores.is_ignored(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TempTree, write_tar_gz, write_zip};
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case::parent_dir("../escape.py")]
    #[case::nested_parent("pkg/../../escape.py")]
    fn rejects_parent_components(#[case] bad: &str) {
        let result = validate_entry_path(&PathBuf::from(bad));
        assert!(
            matches!(result, Err(PackagerError::PathTraversal { .. })),
            "expected PathTraversal for {bad}"
        );
    }

    #[test]
    fn rejects_absolute_path() {
        let result = validate_entry_path(&PathBuf::from("/etc/passwd"));
        assert!(matches!(result, Err(PackagerError::PathTraversal { .. })));
    }

    #[test]
    fn accepts_relative_paths() {
        assert!(validate_entry_path(&PathBuf::from("pkg/mod.py")).is_ok());
    }

    #[test]
    fn tar_extraction_skips_ignored_entries() {
        let tree = TempTree::new();
        let archive = tree.root().join("pkg.tar.gz");
        write_tar_gz(
            &archive,
            &[
                ("pkg/mod.py", b"mod".as_slice()),
                ("pkg/__pycache__/mod.cpython-36.pyc", b"pyc"),
                ("pkg/.git/config", b"git"),
            ],
        );
        let dest = tree.root().join("out");
        std::fs::create_dir_all(&dest).expect("dest");

        extract_tar_gz(&archive, &dest, &IgnorePatternSet::default()).expect("extract");

        assert!(dest.join("pkg/mod.py").is_file());
        assert!(!dest.join("pkg/__pycache__").exists());
        assert!(!dest.join("pkg/.git").exists());
    }

    #[test]
    fn zip_extraction_skips_ignored_entries() {
        let tree = TempTree::new();
        let archive = tree.root().join("pkg.whl");
        write_zip(
            &archive,
            &[
                ("pkg/mod.py", b"mod".as_slice()),
                ("pkg/__pycache__/mod.cpython-36.pyc", b"pyc"),
            ],
        );
        let dest = tree.root().join("out");
        std::fs::create_dir_all(&dest).expect("dest");

        extract_zip(&archive, &dest, &IgnorePatternSet::default()).expect("extract");

        assert!(dest.join("pkg/mod.py").is_file());
        assert!(!dest.join("pkg/__pycache__").exists());
    }
}
