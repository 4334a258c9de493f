//! The bidirectional reference graph.
//!
//! Nodes are opaque asset paths; edges point from a dependent asset to the
//! asset it references and are discovered one node at a time by the
//! resolver. The graph keeps both directions of every edge so that lookups
//! are O(1) either way:
//!
//! * the *forward* side records which assets a node references,
//! * the *reverse* side records which assets reference it.
//!
//! Both sides are updated together, per edge, so for any pair of nodes
//! `B ∈ forward(A)` holds exactly when `A ∈ reverse(B)`. Forward entries
//! are unordered sets; reverse entries keep the order in which dependent
//! assets were processed.

use std::collections::{HashMap, HashSet};

use camino::{Utf8Path, Utf8PathBuf};

/// A bidirectional index of asset references.
#[derive(Debug, Default, Clone)]
pub struct RefGraph {
    /// node → the unique set of assets it references
    forward: HashMap<Utf8PathBuf, HashSet<Utf8PathBuf>>,
    /// node → the assets referencing it, in corpus processing order
    reverse: HashMap<Utf8PathBuf, Vec<Utf8PathBuf>>,
}

impl RefGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a processed node, so it has a forward entry even when the
    /// resolver reported no outgoing references.
    pub(crate) fn touch(&mut self, node: &Utf8Path) {
        self.forward.entry(node.to_owned()).or_default();
    }

    /// Inserts a single dependent → dependency edge into both sides.
    /// Duplicate edges between the same pair of nodes collapse.
    pub(crate) fn insert(&mut self, from: &Utf8Path, to: &Utf8Path) {
        let fresh = self
            .forward
            .entry(from.to_owned())
            .or_default()
            .insert(to.to_owned());

        // The forward side already deduplicates, and a forward hit implies
        // the reverse entry exists, so this append stays duplicate-free.
        if fresh {
            self.reverse
                .entry(to.to_owned())
                .or_default()
                .push(from.to_owned());
        }
    }

    /// The set of assets `node` references, if the node was ever processed.
    pub fn dependencies(&self, node: impl AsRef<Utf8Path>) -> Option<&HashSet<Utf8PathBuf>> {
        self.forward.get(node.as_ref())
    }

    /// The assets referencing `node`, in processing order.
    pub fn referencers(&self, node: impl AsRef<Utf8Path>) -> Option<&[Utf8PathBuf]> {
        self.reverse.get(node.as_ref()).map(Vec::as_slice)
    }

    /// Number of nodes with a forward entry.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.reverse.is_empty()
    }

    /// Reverse entries in case-insensitive key order, ready to persist.
    /// The values keep their processing order untouched.
    pub(crate) fn reverse_entries(&self) -> Vec<(&Utf8PathBuf, &[Utf8PathBuf])> {
        let mut entries: Vec<_> = self
            .reverse
            .iter()
            .map(|(key, values)| (key, values.as_slice()))
            .collect();

        entries.sort_by(|(a, _), (b, _)| {
            let (a, b) = (a.as_str(), b.as_str());
            a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
        });

        entries
    }

    /// Rebuilds the full graph from persisted reverse entries by inverting
    /// them into the forward side. Duplicate values, as can appear in a
    /// hand-edited file, collapse like any other repeated edge.
    pub(crate) fn from_reverse<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Utf8PathBuf, Vec<Utf8PathBuf>)>,
    {
        let mut graph = Self::new();

        for (key, values) in entries {
            for value in values {
                graph.insert(&value, &key);
            }
        }

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(s)
    }

    /// Every forward edge must have a matching reverse entry and vice versa.
    fn assert_bidirectional(graph: &RefGraph) {
        for (from, deps) in &graph.forward {
            for to in deps {
                let referencers = graph.referencers(to).unwrap_or(&[]);
                assert!(
                    referencers.contains(from),
                    "forward edge {from} -> {to} missing from reverse side"
                );
            }
        }
        for (to, referencers) in &graph.reverse {
            for from in referencers {
                let deps = graph.dependencies(from).expect("referencer without forward entry");
                assert!(
                    deps.contains(to),
                    "reverse edge {to} <- {from} missing from forward side"
                );
            }
        }
    }

    #[test]
    fn edges_update_both_sides() {
        let mut graph = RefGraph::new();
        graph.insert(&p("a.prefab"), &p("t.png"));
        graph.insert(&p("b.prefab"), &p("t.png"));

        assert_bidirectional(&graph);
        assert_eq!(
            graph.referencers("t.png").unwrap(),
            &[p("a.prefab"), p("b.prefab")]
        );
        assert!(graph.dependencies("a.prefab").unwrap().contains(&p("t.png")));
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut graph = RefGraph::new();
        graph.insert(&p("a.prefab"), &p("t.png"));
        graph.insert(&p("a.prefab"), &p("t.png"));

        assert_eq!(graph.referencers("t.png").unwrap(), &[p("a.prefab")]);
        assert_eq!(graph.dependencies("a.prefab").unwrap().len(), 1);
        assert_bidirectional(&graph);
    }

    #[test]
    fn touch_creates_empty_forward_entry() {
        let mut graph = RefGraph::new();
        graph.touch(&p("lone.prefab"));

        assert!(graph.dependencies("lone.prefab").unwrap().is_empty());
        assert!(graph.referencers("lone.prefab").is_none());
    }

    #[test]
    fn inversion_restores_forward_side() {
        let mut graph = RefGraph::new();
        graph.insert(&p("a.prefab"), &p("t.png"));
        graph.insert(&p("a.prefab"), &p("u.png"));
        graph.insert(&p("b.prefab"), &p("t.png"));

        let entries: Vec<_> = graph
            .reverse_entries()
            .into_iter()
            .map(|(key, values)| (key.clone(), values.to_vec()))
            .collect();

        let restored = RefGraph::from_reverse(entries);
        assert_bidirectional(&restored);
        assert_eq!(
            restored.dependencies("a.prefab"),
            graph.dependencies("a.prefab")
        );
        assert_eq!(
            restored.referencers("t.png").unwrap(),
            graph.referencers("t.png").unwrap()
        );
    }

    #[test]
    fn reverse_entries_are_sorted_case_insensitively() {
        let mut graph = RefGraph::new();
        graph.insert(&p("x.prefab"), &p("B.png"));
        graph.insert(&p("x.prefab"), &p("a.png"));
        graph.insert(&p("x.prefab"), &p("c.png"));

        let keys: Vec<_> = graph
            .reverse_entries()
            .into_iter()
            .map(|(key, _)| key.as_str().to_owned())
            .collect();

        assert_eq!(keys, vec!["a.png", "B.png", "c.png"]);
    }
}
