//! CLI argument definitions for funcpack.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::Parser;

use crate::registry::DEFAULT_REGISTRY_URL;
use crate::runtime::DEFAULT_RUNTIME;

/// Build a deployable archive for a function-execution runtime.
#[derive(Parser, Debug)]
#[command(name = "funcpack")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build a deployable archive for a function-execution runtime.\n\n",
    "funcpack resolves a package's dependency closure from a package index, ",
    "acquires a runtime-compatible artifact for each dependency (bundled ",
    "store, cached wheel, registry download, or local installation), ",
    "assembles the result into a staging tree with a generated entry-point ",
    "shim, and writes a single deterministic zip archive.\n\n",
    "The package itself is always taken from its local installation; only ",
    "its dependencies are fetched.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package a project for the default runtime:\n",
    "    $ funcpack myapp --entry handler.py --output myapp.zip\n\n",
    "  Target the legacy runtime with a custom index:\n",
    "    $ funcpack myapp --runtime python2.7 --index deps.json \\\n",
    "        --entry handler.py --output myapp.zip\n\n",
    "  Use a pinned artifact store for binary dependencies:\n",
    "    $ funcpack myapp --store artifacts.toml --entry handler.py \\\n",
    "        --output myapp.zip",
))]
pub struct Cli {
    /// Name of the package to bundle.
    #[arg(value_name = "PACKAGE")]
    pub package: String,

    /// File whose contents become the entry-point shim.
    #[arg(short, long, value_name = "FILE")]
    pub entry: Utf8PathBuf,

    /// Destination for the finished archive (a path or a URL).
    #[arg(short, long, value_name = "DEST")]
    pub output: String,

    /// Package index describing installed distributions.
    #[arg(short, long, value_name = "FILE")]
    pub index: Utf8PathBuf,

    /// Bundled artifact store manifest.
    #[arg(short, long, value_name = "FILE")]
    pub store: Option<Utf8PathBuf>,

    /// Target runtime identifier.
    #[arg(short, long, value_name = "RUNTIME", default_value = DEFAULT_RUNTIME)]
    pub runtime: String,

    /// Download cache directory [default: platform-specific].
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Base URL of the artifact registry.
    #[arg(long, value_name = "URL", default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
