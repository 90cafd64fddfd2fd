//! Ignore patterns applied at every copy and extraction site.
//!
//! Version-control metadata and bytecode-cache directories must never end
//! up in the staging tree, regardless of whether files arrive via a
//! directory copy, a wheel extraction, or a legacy bundle extraction.

use camino::Utf8Path;

/// Path components that are never distributable.
const IGNORED_COMPONENTS: &[&str] = &["__pycache__", ".git"];

/// A fixed set of path patterns excluded from all copies and extractions.
///
/// A path is ignored when any of its components matches an ignored name,
/// which covers the component itself and everything beneath it at any
/// depth.
#[derive(Debug, Clone)]
pub struct IgnorePatternSet {
    components: Vec<String>,
}

impl Default for IgnorePatternSet {
    fn default() -> Self {
        Self {
            components: IGNORED_COMPONENTS
                .iter()
                .map(|&c| c.to_owned())
                .collect(),
        }
    }
}

impl IgnorePatternSet {
    /// Whether the given path matches any ignore pattern.
    #[must_use]
    pub fn is_ignored(&self, path: &Utf8Path) -> bool {
        path.components()
            .any(|c| self.components.iter().any(|ignored| c.as_str() == ignored))
    }

    /// Whether an archive-internal entry name (POSIX separators) matches
    /// any ignore pattern.
    #[must_use]
    pub fn is_ignored_entry(&self, name: &str) -> bool {
        name.split('/')
            .any(|c| self.components.iter().any(|ignored| c == ignored))
    }
}
