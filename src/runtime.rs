//! Target runtime identification.
//!
//! A [`Runtime`] names the execution environment the produced archive must
//! be compatible with (for example `python3.6`). It derives the wheel
//! platform-tag suffix used to select binary-compatible artifacts and the
//! interpreter invoked for bytecode compilation.

use std::fmt;

/// The default target runtime when none is configured.
pub const DEFAULT_RUNTIME: &str = "python3.6";

/// Identifier for the target function-execution runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runtime(String);

impl Runtime {
    /// Create a runtime identifier from its canonical string form.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The canonical string form, also the interpreter executable name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The wheel filename suffix denoting binary compatibility with this
    /// runtime.
    ///
    /// # Examples
    ///
    /// ```
    /// use funcpack::runtime::Runtime;
    ///
    /// let runtime = Runtime::new("python3.6");
    /// assert_eq!(runtime.wheel_suffix(), "cp36m-manylinux1_x86_64.whl");
    /// ```
    #[must_use]
    pub fn wheel_suffix(&self) -> &'static str {
        if self.0 == "python2.7" {
            "cp27mu-manylinux1_x86_64.whl"
        } else {
            "cp36m-manylinux1_x86_64.whl"
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::python2("python2.7", "cp27mu-manylinux1_x86_64.whl")]
    #[case::python3("python3.6", "cp36m-manylinux1_x86_64.whl")]
    fn wheel_suffix_per_runtime(#[case] id: &str, #[case] expected: &str) {
        assert_eq!(Runtime::new(id).wheel_suffix(), expected);
    }

    #[test]
    fn default_runtime_is_python3() {
        assert_eq!(Runtime::default().as_str(), DEFAULT_RUNTIME);
    }
}
