//! Output formatting for the funcpack CLI.

use crate::index::Distribution;

/// Format a success message after delivery.
#[must_use]
pub fn success_message(package: &str, dependency_count: usize, destination: &str) -> String {
    let plural = if dependency_count == 1 {
        "dependency"
    } else {
        "dependencies"
    };
    format!("Packaged {package} with {dependency_count} {plural} to {destination}")
}

/// Format the one-line progress entry for a resolved distribution.
#[must_use]
pub fn distribution_line(dist: &Distribution) -> String {
    format!("  - {} {}", dist.name, dist.version)
}
