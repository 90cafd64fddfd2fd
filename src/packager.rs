//! End-to-end packaging pipeline.
//!
//! Wires the resolver, the acquisition chain, the staging assembler, the
//! archive writer, and the output sink into one run. The staging tree and
//! the intermediate archive are temporary and discarded on every exit
//! path, successful or not.

use camino::{Utf8Path, Utf8PathBuf};

use crate::acquire::AcquireContext;
use crate::archive::create_zip_bundle;
use crate::compile::SourceCompiler;
use crate::error::{PackagerError, Result};
use crate::ignore::IgnorePatternSet;
use crate::index::PackageIndex;
use crate::registry::ReleaseIndex;
use crate::resolver::{DependencySet, resolve};
use crate::runtime::Runtime;
use crate::sink::output_bundle;
use crate::staging::{StagingTree, assemble};
use crate::store::BundledStore;

/// Configuration for a packaging run.
#[derive(Debug, Clone)]
pub struct PackagerConfig {
    /// The target runtime artifacts must be compatible with.
    pub runtime: Runtime,
    /// The private download cache root, created on demand.
    pub cache_root: Utf8PathBuf,
    /// The host package tooling's wheel cache, when resolvable.
    pub wheel_cache_dir: Option<Utf8PathBuf>,
    /// The bundled, version-pinned artifact store.
    pub store: BundledStore,
    /// Patterns excluded from every copy and extraction.
    pub ignores: IgnorePatternSet,
}

impl PackagerConfig {
    /// Create a configuration with an empty store and default ignores.
    #[must_use]
    pub fn new(runtime: Runtime, cache_root: Utf8PathBuf) -> Self {
        Self {
            runtime,
            cache_root,
            wheel_cache_dir: None,
            store: BundledStore::empty(),
            ignores: IgnorePatternSet::default(),
        }
    }

    /// Wheel cache directories scanned in order: the host tooling's cache
    /// first, the private cache as fallback.
    #[must_use]
    pub fn wheel_cache_dirs(&self) -> Vec<Utf8PathBuf> {
        let mut dirs = Vec::new();
        if let Some(cache) = &self.wheel_cache_dir {
            dirs.push(cache.clone());
        }
        dirs.push(self.cache_root.clone());
        dirs
    }
}

/// Build and deliver the deployment archive for `root_name`.
///
/// Returns the resolved dependency set the archive was built from.
///
/// # Errors
///
/// Propagates resolution, acquisition, assembly, archiving, and output
/// failures. No partial archive is ever delivered.
pub fn package(
    index: &dyn PackageIndex,
    registry: &dyn ReleaseIndex,
    compiler: &dyn SourceCompiler,
    config: &PackagerConfig,
    root_name: &str,
    entry_text: &str,
    destination: &str,
) -> Result<DependencySet> {
    let dependencies = resolve(index, root_name)?;
    let root = dependencies
        .get(root_name)
        .cloned()
        .ok_or_else(|| PackagerError::UnresolvedDependency {
            name: root_name.to_owned(),
        })?;

    let staging_guard = tempfile::tempdir()?;
    let staging = StagingTree::new(utf8_path(staging_guard.path())?);

    let ctx = AcquireContext {
        store: &config.store,
        registry,
        runtime: &config.runtime,
        wheel_cache_dirs: config.wheel_cache_dirs(),
        private_cache_dir: config.cache_root.clone(),
        ignores: &config.ignores,
    };

    assemble(&staging, &ctx, &dependencies, &root, compiler, entry_text)?;

    let archive_guard = tempfile::Builder::new()
        .prefix("funcpack-")
        .suffix(".zip")
        .tempfile()?;
    let archive_path = utf8_path(archive_guard.path())?;
    create_zip_bundle(staging.root(), &archive_path)?;
    output_bundle(&archive_path, destination)?;

    Ok(dependencies)
}

fn utf8_path(path: &std::path::Path) -> Result<Utf8PathBuf> {
    Utf8Path::from_path(path)
        .map(Utf8Path::to_owned)
        .ok_or_else(|| PackagerError::Staging {
            reason: format!("temporary path is not valid UTF-8: {}", path.display()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::MockSourceCompiler;
    use crate::index::{Distribution, JsonFileIndex};
    use crate::registry::MockReleaseIndex;
    use crate::test_utils::{TempTree, write_file};
    use std::io::Read;

    #[test]
    fn packages_local_only_project_end_to_end() {
        let tree = TempTree::new();
        let install = tree.root().join("site-packages");
        write_file(
            &install.join("myapp.egg-info").join("top_level.txt"),
            b"myapp\n",
        );
        write_file(&install.join("myapp").join("__init__.py"), b"app = 1\n");

        let index = JsonFileIndex::from_distributions(vec![Distribution {
            name: "myapp".to_owned(),
            version: "1.0".to_owned(),
            location: Some(install),
            requires: Vec::new(),
        }]);
        let mut registry = MockReleaseIndex::new();
        registry.expect_release_metadata().never();
        registry.expect_download().never();
        let mut compiler = MockSourceCompiler::new();
        compiler.expect_compile_tree().returning(|_| Ok(()));

        let config = PackagerConfig::new(
            Runtime::new("python3.6"),
            tree.root().join("cache"),
        );
        let destination = tree.root().join("bundle.zip");

        package(
            &index,
            &registry,
            &compiler,
            &config,
            "myapp",
            "from myapp import app\n",
            destination.as_str(),
        )
        .expect("package");

        let file = std::fs::File::open(&destination).expect("open bundle");
        let mut archive = zip::ZipArchive::new(file).expect("read bundle");
        let mut shim = String::new();
        archive
            .by_name("index.py")
            .expect("shim entry")
            .read_to_string(&mut shim)
            .expect("shim contents");
        assert_eq!(shim, "from myapp import app\n");
        assert!(archive.by_name("myapp/__init__.py").is_ok());
    }

    #[test]
    fn unknown_root_fails_before_any_side_effects() {
        let tree = TempTree::new();
        let index = JsonFileIndex::from_distributions(Vec::new());
        let registry = MockReleaseIndex::new();
        let compiler = MockSourceCompiler::new();
        let config = PackagerConfig::new(
            Runtime::new("python3.6"),
            tree.root().join("cache"),
        );
        let destination = tree.root().join("bundle.zip");

        let result = package(
            &index,
            &registry,
            &compiler,
            &config,
            "ghost",
            "",
            destination.as_str(),
        );

        assert!(matches!(
            result,
            Err(PackagerError::UnresolvedDependency { .. })
        ));
        assert!(!destination.exists());
    }
}
