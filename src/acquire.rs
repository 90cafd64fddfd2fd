//! Ordered acquisition-strategy chain.
//!
//! For each non-root dependency the chain tries strategies strictly in
//! order, preferring artifacts known to be binary-compatible with the
//! target runtime, then cached portable binaries, then a network download,
//! then a version-relaxed store match, and only as a last resort whatever
//! is installed locally. Each strategy reports a tri-state outcome: it
//! installed the dependency, it was not applicable, or it failed fatally.

use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

use crate::error::{PackagerError, Result};
use crate::extract::{extract_tar_gz, extract_zip};
use crate::ignore::IgnorePatternSet;
use crate::index::Distribution;
use crate::registry::{ReleaseIndex, compute_sha256};
use crate::resolver::DependencySet;
use crate::runtime::Runtime;
use crate::store::{BundledStore, VersionMatch};
use crate::unpack::unpack_local;
use crate::wheels::{ensure_cache_dir, find_cached_wheel, wheel_file_name};

/// Outcome of one strategy attempt. A fatal error is an `Err` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The dependency was installed into the staging tree.
    Installed,
    /// The strategy had nothing to offer; try the next one.
    NotApplicable,
}

/// Shared collaborators and configuration for acquisition attempts.
pub struct AcquireContext<'a> {
    /// The bundled, version-pinned artifact store.
    pub store: &'a BundledStore,
    /// Release-metadata and download client.
    pub registry: &'a dyn ReleaseIndex,
    /// The target runtime artifacts must be compatible with.
    pub runtime: &'a Runtime,
    /// Wheel cache directories scanned in order; the private cache last.
    pub wheel_cache_dirs: Vec<Utf8PathBuf>,
    /// The private download cache, created on demand.
    pub private_cache_dir: Utf8PathBuf,
    /// Patterns excluded from every extraction.
    pub ignores: &'a IgnorePatternSet,
}

/// One way of obtaining an installable artifact for a dependency.
trait AcquireStrategy {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Try to install `dist` into `staging`.
    fn attempt(
        &self,
        ctx: &AcquireContext<'_>,
        staging: &Utf8Path,
        dist: &Distribution,
    ) -> Result<Outcome>;
}

/// Strategies 1 and 4: bundled-store lookup, strict or version-relaxed.
struct BundledArtifact {
    require_exact_version: bool,
}

impl AcquireStrategy for BundledArtifact {
    fn name(&self) -> &'static str {
        if self.require_exact_version {
            "bundled store (exact version)"
        } else {
            "bundled store (any version)"
        }
    }

    fn attempt(
        &self,
        ctx: &AcquireContext<'_>,
        staging: &Utf8Path,
        dist: &Distribution,
    ) -> Result<Outcome> {
        let version = if self.require_exact_version {
            VersionMatch::Exact(&dist.version)
        } else {
            VersionMatch::Any
        };
        let Some(record) = ctx.store.lookup(&dist.name, ctx.runtime, version) else {
            return Ok(Outcome::NotApplicable);
        };
        extract_tar_gz(&record.path, staging, ctx.ignores)?;
        Ok(Outcome::Installed)
    }
}

/// Strategy 2: a wheel already present in one of the cache directories.
struct CachedWheel;

impl AcquireStrategy for CachedWheel {
    fn name(&self) -> &'static str {
        "cached wheel"
    }

    fn attempt(
        &self,
        ctx: &AcquireContext<'_>,
        staging: &Utf8Path,
        dist: &Distribution,
    ) -> Result<Outcome> {
        let suffix = ctx.runtime.wheel_suffix();
        let Some(wheel) = find_cached_wheel(
            &ctx.wheel_cache_dirs,
            &dist.canonical_name(),
            &dist.version,
            suffix,
        ) else {
            return Ok(Outcome::NotApplicable);
        };
        extract_zip(&wheel, staging, ctx.ignores)?;
        Ok(Outcome::Installed)
    }
}

/// Strategy 3: download a wheel from the registry into the private cache.
struct DownloadedWheel;

impl AcquireStrategy for DownloadedWheel {
    fn name(&self) -> &'static str {
        "registry download"
    }

    fn attempt(
        &self,
        ctx: &AcquireContext<'_>,
        staging: &Utf8Path,
        dist: &Distribution,
    ) -> Result<Outcome> {
        let cache_dir = ensure_cache_dir(&ctx.private_cache_dir)?;

        let name = dist.canonical_name();
        let doc = ctx.registry.release_metadata(&name)?;
        let suffix = ctx.runtime.wheel_suffix();
        let Some(artifact) = doc.find_artifact(&dist.version, suffix) else {
            return Ok(Outcome::NotApplicable);
        };

        let wheel_path = cache_dir.join(wheel_file_name(&name, &dist.version, suffix));
        ctx.registry.download(&artifact.url, &wheel_path)?;

        if let Some(expected) = artifact.digests.sha256.as_deref() {
            let actual = compute_sha256(&wheel_path)?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(PackagerError::ChecksumMismatch {
                    url: artifact.url.clone(),
                    expected: expected.to_owned(),
                    actual,
                });
            }
        }

        extract_zip(&wheel_path, staging, ctx.ignores)?;
        Ok(Outcome::Installed)
    }
}

/// Strategy 5: unpack whatever is installed locally, without any
/// compatibility guarantee for the target runtime.
struct LocalInstall;

impl AcquireStrategy for LocalInstall {
    fn name(&self) -> &'static str {
        "local installation"
    }

    fn attempt(
        &self,
        ctx: &AcquireContext<'_>,
        staging: &Utf8Path,
        dist: &Distribution,
    ) -> Result<Outcome> {
        match unpack_local(staging, dist, ctx.ignores) {
            Ok(()) => Ok(Outcome::Installed),
            // In chain context an unusable local layout is a miss, not a
            // fatal error; the chain reports NoSuitableArtifact instead.
            Err(
                PackagerError::UnsupportedLocalLayout { .. }
                | PackagerError::OwnershipManifestMissing { .. },
            ) => Ok(Outcome::NotApplicable),
            Err(other) => Err(other),
        }
    }
}

fn strategy_chain() -> Vec<Box<dyn AcquireStrategy>> {
    vec![
        Box::new(BundledArtifact {
            require_exact_version: true,
        }),
        Box::new(CachedWheel),
        Box::new(DownloadedWheel),
        Box::new(BundledArtifact {
            require_exact_version: false,
        }),
        Box::new(LocalInstall),
    ]
}

/// Acquire one dependency into the staging tree via the strategy chain.
///
/// # Errors
///
/// Returns [`PackagerError::NoSuitableArtifact`] when every strategy is
/// exhausted, or the first fatal error a strategy reports.
pub fn acquire(
    ctx: &AcquireContext<'_>,
    staging: &Utf8Path,
    dist: &Distribution,
) -> Result<()> {
    for strategy in strategy_chain() {
        debug!("trying {} for {}=={}", strategy.name(), dist.name, dist.version);
        match strategy.attempt(ctx, staging, dist)? {
            Outcome::Installed => {
                debug!("installed {}=={} via {}", dist.name, dist.version, strategy.name());
                return Ok(());
            }
            Outcome::NotApplicable => {}
        }
    }
    Err(PackagerError::NoSuitableArtifact {
        name: dist.canonical_name(),
        version: dist.version.clone(),
    })
}

/// Acquire every non-root member of a dependency set.
///
/// The root is excluded: it is always installed via the local unpacker,
/// never downloaded or overridden.
///
/// # Errors
///
/// Propagates the first acquisition failure; there is no partial-success
/// mode, because a missing dependency makes the produced archive
/// non-functional.
pub fn install_dependencies(
    ctx: &AcquireContext<'_>,
    staging: &Utf8Path,
    dependencies: &DependencySet,
    root_name: &str,
) -> Result<()> {
    let root = crate::index::canonicalize(root_name);
    for dist in dependencies.distributions() {
        if dist.canonical_name() == root {
            continue;
        }
        acquire(ctx, staging, dist)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "acquire_tests.rs"]
mod tests;
