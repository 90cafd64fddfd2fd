//! Transitive dependency resolution over the installed-package index.
//!
//! Expands one root distribution into the full set of distributions
//! reachable via declared requirements. Deduplication is by canonical
//! name, so requirement cycles terminate instead of looping.

use std::collections::BTreeMap;

use crate::error::{PackagerError, Result};
use crate::index::{Distribution, PackageIndex, canonicalize};

/// The transitive dependency closure of one root distribution.
///
/// Membership is what matters; insertion order is irrelevant. The map is
/// keyed by canonical name, which is also what guarantees termination of
/// the walk on cyclic requirement graphs.
#[derive(Debug, Clone, Default)]
pub struct DependencySet {
    by_name: BTreeMap<String, Distribution>,
}

impl DependencySet {
    /// Look up a member by canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Distribution> {
        self.by_name.get(&canonicalize(name))
    }

    /// Whether a distribution with this canonical name is a member.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&canonicalize(name))
    }

    /// Iterate over all member distributions.
    pub fn distributions(&self) -> impl Iterator<Item = &Distribution> {
        self.by_name.values()
    }

    /// Number of member distributions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Resolve the full transitive dependency set of `root_name`.
///
/// Visited names are memoized before their requirements are expanded, so a
/// requirement cycle is simply a repeat membership test, not an infinite
/// walk.
///
/// # Errors
///
/// Returns [`PackagerError::UnresolvedDependency`] when `root_name` or any
/// declared requirement is absent from the index. No I/O side effects have
/// occurred by the time this error is reported.
pub fn resolve(index: &dyn PackageIndex, root_name: &str) -> Result<DependencySet> {
    let mut set = DependencySet::default();
    let mut pending = vec![canonicalize(root_name)];

    while let Some(name) = pending.pop() {
        if set.contains(&name) {
            continue;
        }
        let Some(dist) = index.lookup(&name) else {
            return Err(PackagerError::UnresolvedDependency { name });
        };
        for requirement in &dist.requires {
            pending.push(canonicalize(requirement));
        }
        set.by_name.insert(name, dist);
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::JsonFileIndex;

    fn dist(name: &str, requires: &[&str]) -> Distribution {
        Distribution {
            name: name.to_owned(),
            version: "1.0".to_owned(),
            location: None,
            requires: requires.iter().map(|&r| r.to_owned()).collect(),
        }
    }

    #[test]
    fn resolves_transitive_closure() {
        let index = JsonFileIndex::from_distributions(vec![
            dist("app", &["requests"]),
            dist("requests", &["urllib3", "idna"]),
            dist("urllib3", &[]),
            dist("idna", &[]),
        ]);

        let set = resolve(&index, "app").expect("resolve");
        assert_eq!(set.len(), 4);
        assert!(set.contains("urllib3"));
        assert!(set.contains("app"));
    }

    #[test]
    fn terminates_on_requirement_cycle() {
        let index = JsonFileIndex::from_distributions(vec![
            dist("a", &["b"]),
            dist("b", &["c"]),
            dist("c", &["a"]),
        ]);

        let set = resolve(&index, "a").expect("resolve");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn deduplicates_by_case_folded_name() {
        let index = JsonFileIndex::from_distributions(vec![
            dist("app", &["Requests", "requests"]),
            dist("requests", &[]),
        ]);

        let set = resolve(&index, "app").expect("resolve");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn missing_requirement_is_unresolved() {
        let index = JsonFileIndex::from_distributions(vec![dist("app", &["ghost"])]);

        let result = resolve(&index, "app");
        match result {
            Err(PackagerError::UnresolvedDependency { name }) => assert_eq!(name, "ghost"),
            other => panic!("expected UnresolvedDependency, got {other:?}"),
        }
    }

    #[test]
    fn missing_root_is_unresolved() {
        let index = JsonFileIndex::from_distributions(Vec::new());
        assert!(matches!(
            resolve(&index, "app"),
            Err(PackagerError::UnresolvedDependency { .. })
        ));
    }
}
