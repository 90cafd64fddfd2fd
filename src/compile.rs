//! Bytecode compilation of staged source files.
//!
//! Compilation is best-effort by design: a dependency may ship optional
//! modules that are not valid for the target runtime, and a syntax error
//! in one of them must not abort the packaging run. Failures are logged
//! and skipped.

use std::process::Command;

use camino::Utf8Path;
use log::{debug, warn};

use crate::error::Result;
use crate::runtime::Runtime;

/// Compiles every source file beneath a directory into its bytecode form.
#[cfg_attr(test, mockall::automock)]
pub trait SourceCompiler {
    /// Compile the tree rooted at `root`, best-effort.
    ///
    /// # Errors
    ///
    /// Implementations reserve the right to fail, but per-file compilation
    /// problems are recovered, not reported.
    fn compile_tree(&self, root: &Utf8Path) -> Result<()>;
}

/// Compiler shelling out to the target runtime's interpreter.
///
/// Runs the interpreter's `compileall` module over the tree with arguments
/// chosen so each bytecode file lands next to its source, which is the
/// layout the pruning pass expects. A missing interpreter or a non-zero
/// exit status is logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct InterpreterCompiler {
    runtime: Runtime,
}

impl InterpreterCompiler {
    /// Create a compiler for the given target runtime.
    #[must_use]
    pub fn new(runtime: Runtime) -> Self {
        Self { runtime }
    }
}

/// Interpreter arguments for a sibling-`.pyc` compile of a tree.
///
/// `python2.7`'s `compileall` writes sibling `.pyc` files by default and
/// rejects `-b` outright; newer interpreters need `-b` to opt out of the
/// `__pycache__` layout.
fn compile_args(runtime: &Runtime) -> &'static [&'static str] {
    if runtime.as_str() == "python2.7" {
        &["-m", "compileall", "-q"]
    } else {
        &["-m", "compileall", "-b", "-q"]
    }
}

impl SourceCompiler for InterpreterCompiler {
    fn compile_tree(&self, root: &Utf8Path) -> Result<()> {
        let output = Command::new(self.runtime.as_str())
            .args(compile_args(&self.runtime))
            .arg(root.as_std_path())
            .output();

        match output {
            Ok(output) if output.status.success() => {
                debug!("compiled sources under {root}");
            }
            Ok(output) => {
                // Some sources did not compile; they ship as source instead.
                warn!(
                    "compilation under {root} reported errors: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Err(e) => {
                warn!(
                    "interpreter {} unavailable, shipping sources uncompiled: {e}",
                    self.runtime
                );
            }
        }

        Ok(())
    }
}
