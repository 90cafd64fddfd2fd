//! Staging tree assembly.
//!
//! Orchestrates one packaging run's population of the staging directory:
//! acquire every non-root dependency, unpack the root distribution from
//! its local installation, compile bytecode, prune source files that now
//! have a compiled sibling, and inject the entry-point shim. The staging
//! tree is owned exclusively by one run and is never shared.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::acquire::{AcquireContext, install_dependencies};
use crate::compile::SourceCompiler;
use crate::error::Result;
use crate::index::Distribution;
use crate::resolver::DependencySet;
use crate::unpack::unpack_local;

/// Fixed filename of the entry-point shim at the staging tree root.
pub const SHIM_FILE_NAME: &str = "index.py";

/// Bytecode-cache directory name removed during pruning.
const BYTECODE_CACHE_DIR: &str = "__pycache__";

/// A scratch directory being populated with the final archive's contents.
#[derive(Debug)]
pub struct StagingTree {
    root: Utf8PathBuf,
}

impl StagingTree {
    /// Wrap an existing directory as a staging tree.
    ///
    /// The caller retains ownership of the directory's lifetime; one run
    /// must use a private directory (typically a fresh temporary one).
    #[must_use]
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// The staging tree root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Populate the staging tree for one packaging run.
///
/// Phases run strictly in order: dependency acquisition, root unpacking,
/// bytecode compilation, pruning, shim injection.
///
/// # Errors
///
/// Propagates acquisition and unpacking failures; compilation is
/// best-effort and never fatal.
pub fn assemble(
    staging: &StagingTree,
    ctx: &AcquireContext<'_>,
    dependencies: &DependencySet,
    root: &Distribution,
    compiler: &dyn SourceCompiler,
    entry_text: &str,
) -> Result<()> {
    install_dependencies(ctx, staging.root(), dependencies, &root.name)?;

    // The root is always installed from its local installation; it is
    // never downloaded or overridden by a cached artifact.
    unpack_local(staging.root(), root, ctx.ignores)?;

    compiler.compile_tree(staging.root())?;
    prune_compiled_sources(staging.root())?;
    write_shim(staging.root(), entry_text)?;

    Ok(())
}

/// Delete redundant source files and transient compilation caches.
///
/// Any `.py` file whose `.pyc` sibling exists is removed, and every
/// bytecode-cache directory is removed wholesale.
///
/// # Errors
///
/// Returns [`crate::error::PackagerError::Io`] on filesystem failures.
pub fn prune_compiled_sources(root: &Utf8Path) -> Result<()> {
    let mut source_files = Vec::new();
    let mut cache_dirs = Vec::new();
    collect_prunable(root, &mut source_files, &mut cache_dirs)?;

    for cache_dir in cache_dirs {
        debug!("removing bytecode cache {cache_dir}");
        std::fs::remove_dir_all(&cache_dir)?;
    }

    for source in source_files {
        let compiled = Utf8PathBuf::from(format!("{source}c"));
        if compiled.exists() {
            debug!("pruning {source} in favour of {compiled}");
            std::fs::remove_file(&source)?;
        }
    }

    Ok(())
}

/// Collect `.py` files and bytecode-cache directories beneath `dir`.
///
/// Cache directories are collected but not descended into; their contents
/// are removed wholesale.
fn collect_prunable(
    dir: &Utf8Path,
    source_files: &mut Vec<Utf8PathBuf>,
    cache_dirs: &mut Vec<Utf8PathBuf>,
) -> Result<()> {
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if entry.file_name() == BYTECODE_CACHE_DIR {
                cache_dirs.push(path.to_owned());
            } else {
                collect_prunable(path, source_files, cache_dirs)?;
            }
        } else if path.extension() == Some("py") {
            source_files.push(path.to_owned());
        }
    }
    Ok(())
}

/// Write the caller-supplied entry-point text verbatim to the shim file.
///
/// # Errors
///
/// Returns [`crate::error::PackagerError::Io`] when the file cannot be
/// written.
pub fn write_shim(root: &Utf8Path, entry_text: &str) -> Result<()> {
    std::fs::write(root.join(SHIM_FILE_NAME), entry_text)?;
    Ok(())
}
