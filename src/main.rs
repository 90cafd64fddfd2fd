//! funcpack CLI entrypoint.
//!
//! This binary resolves a package's dependency closure, acquires
//! runtime-compatible artifacts, and delivers a single deployable zip
//! archive. Progress is reported on stderr; errors exit with status 1.

use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

use funcpack::cli::Cli;
use funcpack::compile::InterpreterCompiler;
use funcpack::dirs::{BaseDirs, SystemBaseDirs, default_cache_root};
use funcpack::error::{PackagerError, Result};
use funcpack::index::JsonFileIndex;
use funcpack::output::{distribution_line, success_message};
use funcpack::packager::{PackagerConfig, package};
use funcpack::registry::HttpRegistry;
use funcpack::runtime::Runtime;
use funcpack::store::BundledStore;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let index = JsonFileIndex::load(&cli.index)?;
    let store = load_store(cli)?;
    let cache_root = determine_cache_root(cli.cache_dir.clone())?;
    let runtime = Runtime::new(&cli.runtime);

    let mut config = PackagerConfig::new(runtime.clone(), cache_root);
    config.store = store;
    config.wheel_cache_dir = host_wheel_cache(&SystemBaseDirs);

    let registry = HttpRegistry::new(&cli.registry_url);
    let compiler = InterpreterCompiler::new(runtime);
    let entry_text = read_entry_text(&cli.entry)?;

    if !cli.quiet {
        write_stderr_line(
            stderr,
            format!("Packaging {} for {}...", cli.package, cli.runtime),
        );
    }

    let dependencies = package(
        &index,
        &registry,
        &compiler,
        &config,
        &cli.package,
        &entry_text,
        &cli.output,
    )?;

    if !cli.quiet {
        for dist in dependencies.distributions() {
            write_stderr_line(stderr, distribution_line(dist));
        }
        write_stderr_line(stderr, "");
        let dependency_count = dependencies.len().saturating_sub(1);
        write_stderr_line(
            stderr,
            success_message(&cli.package, dependency_count, &cli.output),
        );
    }

    Ok(())
}

/// Loads the bundled artifact store, or an empty one when not configured.
fn load_store(cli: &Cli) -> Result<BundledStore> {
    match &cli.store {
        Some(path) => BundledStore::load(path),
        None => Ok(BundledStore::empty()),
    }
}

/// Reads the entry-point shim text, naming the path on failure.
fn read_entry_text(path: &Utf8PathBuf) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| PackagerError::InvalidEntry {
        path: path.clone(),
        reason: e.to_string(),
    })
}

/// Determines the download cache root from the CLI or the platform default.
fn determine_cache_root(cli_cache: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
    cli_cache
        .or_else(default_cache_root)
        .ok_or_else(|| PackagerError::Staging {
            reason: "could not determine default cache directory".to_owned(),
        })
}

/// The host package tooling's wheel cache, when it can be located.
fn host_wheel_cache(dirs: &dyn BaseDirs) -> Option<Utf8PathBuf> {
    dirs.wheel_cache_dir()
        .and_then(|path| Utf8PathBuf::try_from(path).ok())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = PackagerError::UnresolvedDependency {
            name: "ghost".to_owned(),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("ghost"));
    }

    #[test]
    fn missing_entry_file_names_its_path() {
        let path = Utf8PathBuf::from("/nonexistent/handler.py");

        let err = read_entry_text(&path).expect_err("expected read to fail");

        assert!(matches!(err, PackagerError::InvalidEntry { .. }));
        assert!(err.to_string().contains("/nonexistent/handler.py"));
    }

    #[test]
    fn determine_cache_root_prefers_cli_value() {
        let root = determine_cache_root(Some(Utf8PathBuf::from("/tmp/custom-cache")))
            .expect("expected cache root");
        assert_eq!(root, Utf8PathBuf::from("/tmp/custom-cache"));
    }

    #[test]
    fn determine_cache_root_falls_back_to_platform_default() {
        let root = determine_cache_root(None).expect("expected cache root");
        assert!(root.as_str().ends_with("funcpack-cache"));
    }

    #[test]
    fn load_store_is_empty_when_unconfigured() {
        let cli = Cli::parse_from([
            "funcpack",
            "myapp",
            "--entry",
            "handler.py",
            "--output",
            "out.zip",
            "--index",
            "deps.json",
        ]);

        let store = load_store(&cli).expect("expected empty store");
        assert!(store.is_empty());
    }
}
