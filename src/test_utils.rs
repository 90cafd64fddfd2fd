//! Shared test fixtures for the funcpack crate.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};

/// Create a zip archive at `path` with the given `(entry name, contents)`
/// pairs.
pub fn write_zip(path: &Utf8Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create zip");
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(*name, options).expect("start entry");
        writer.write_all(data).expect("write entry");
    }
    writer.finish().expect("finish zip");
}

/// Create a gzip-compressed tar archive at `path` with the given
/// `(entry name, contents)` pairs.
pub fn write_tar_gz(path: &Utf8Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create tar.gz");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).expect("append entry");
    }
    let encoder = builder.into_inner().expect("finish tar");
    encoder.finish().expect("finish gzip");
}

/// Create a file (and its parent directories) with the given contents.
pub fn write_file(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parents");
    }
    std::fs::write(path, contents).expect("write file");
}

/// A temporary directory exposed as a UTF-8 path.
pub struct TempTree {
    _guard: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl TempTree {
    /// Create a fresh temporary directory.
    pub fn new() -> Self {
        let guard = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(guard.path().to_path_buf()).expect("utf8 temp dir");
        Self {
            _guard: guard,
            root,
        }
    }

    /// The directory root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}
