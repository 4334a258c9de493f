//! Read-only lookups against a built reference graph.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};

use crate::classify::Category;
use crate::graph::RefGraph;

/// The answer to a single reference lookup.
///
/// `references` lists the assets which depend on the queried node, sorted
/// case-insensitively. `dependencies` lists the assets the node depends on,
/// bucketed by [`Category`] (iteration follows the display order) with each
/// bucket sorted case-insensitively as well.
///
/// A node absent from the graph yields both fields empty; an asset with no
/// known relations is a perfectly valid query target.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub references: Vec<Utf8PathBuf>,
    pub dependencies: BTreeMap<Category, Vec<Utf8PathBuf>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.dependencies.is_empty()
    }
}

/// Looks up both directions of the graph for `target`.
///
/// Repeatable and read-only; the graph is never mutated by a query.
pub fn query(graph: &RefGraph, target: impl AsRef<Utf8Path>) -> QueryResult {
    let target = target.as_ref();

    let mut references = graph
        .referencers(target)
        .map(<[_]>::to_vec)
        .unwrap_or_default();
    sort_paths(&mut references);

    let mut dependencies: BTreeMap<Category, Vec<Utf8PathBuf>> = BTreeMap::new();
    if let Some(deps) = graph.dependencies(target) {
        for dep in deps {
            dependencies
                .entry(Category::classify(dep))
                .or_default()
                .push(dep.clone());
        }
        for bucket in dependencies.values_mut() {
            sort_paths(bucket);
        }
    }

    QueryResult {
        references,
        dependencies,
    }
}

fn sort_paths(paths: &mut [Utf8PathBuf]) {
    paths.sort_by(|a, b| {
        let (a, b) = (a.as_str(), b.as_str());
        a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
    });
}
