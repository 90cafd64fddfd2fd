//! Deterministic archive serialization.
//!
//! Walks the staging tree and writes every regular file into a
//! deflate-compressed zip archive. Archive-internal paths are POSIX-style
//! relative paths with no leading separator; directory entries are not
//! stored. Entries are sorted by path before serialization so the archive
//! is bit-reproducible for a fixed staging-tree state.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{PackagerError, Result};

/// Serialize the staging tree into a zip archive at `out_path`.
///
/// # Errors
///
/// Returns [`PackagerError::Io`] on filesystem failures and
/// [`PackagerError::Archive`] when the archive cannot be written.
pub fn create_zip_bundle(staging_root: &Utf8Path, out_path: &Utf8Path) -> Result<()> {
    let mut entries = Vec::new();
    collect_files(staging_root, &mut entries)?;

    let mut named: Vec<(String, Utf8PathBuf)> = entries
        .into_iter()
        .map(|path| {
            let name = archive_entry_name(staging_root, &path)?;
            Ok((name, path))
        })
        .collect::<Result<_>>()?;
    named.sort_by(|a, b| a.0.cmp(&b.0));

    let file = std::fs::File::create(out_path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, path) in named {
        writer.start_file(name, options)?;
        let contents = std::fs::read(&path)?;
        writer.write_all(&contents)?;
    }
    writer.finish()?;

    Ok(())
}

/// The archive-internal name for a staged file: its path relative to the
/// staging root, with POSIX separators and no leading separator.
fn archive_entry_name(staging_root: &Utf8Path, path: &Utf8Path) -> Result<String> {
    let relative = path
        .strip_prefix(staging_root)
        .map_err(|_| PackagerError::Archive {
            reason: format!("{path} is outside the staging tree {staging_root}"),
        })?;
    let name = relative.as_str().replace('\\', "/");
    Ok(name.trim_start_matches('/').to_owned())
}

/// Recursively collect every regular file beneath `dir`.
fn collect_files(dir: &Utf8Path, files: &mut Vec<Utf8PathBuf>) -> Result<()> {
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            collect_files(entry.path(), files)?;
        } else {
            files.push(entry.path().to_owned());
        }
    }
    Ok(())
}
