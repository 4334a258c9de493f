//! Time-sliced construction of the reference graph.
//!
//! Resolving one asset can be slow, and a corpus holds thousands, so a
//! build never runs in one gulp. It is a resumable pass: each [`Build::step`]
//! call resolves one bounded batch of nodes and hands control back, which
//! keeps a single-threaded host responsive no matter how large the corpus
//! is. Cancellation and progress are observed only between batches, never
//! in the middle of one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use camino::Utf8PathBuf;

use crate::graph::RefGraph;
use crate::resolve::Resolve;

/// Nodes resolved per step when not configured otherwise.
pub const DEFAULT_BATCH: usize = 20;

/// Progress of an active build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Nodes processed so far, skipped ones included.
    pub completed: usize,
    /// Corpus size, fixed at enumeration time.
    pub total: usize,
}

/// Final tally of a completed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    /// Nodes whose references were resolved and recorded.
    pub indexed: usize,
    /// Nodes dropped because their resolver call failed.
    pub skipped: usize,
    pub total: usize,
}

/// What a single [`Index::step`](crate::Index::step) call achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// A batch was processed; more remain.
    Pending(Progress),
    /// The pass finished and the new graph is committed and queryable.
    Done(BuildSummary),
    /// The pass was cancelled; everything it accumulated was discarded.
    Cancelled,
}

/// How a driven-to-the-end build concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Completed(BuildSummary),
    Cancelled,
}

/// Requests cancellation of the active build from another thread.
///
/// Cancellation is cooperative: it takes effect at the next batch boundary,
/// where the build stops scheduling further work and discards its state.
#[derive(Debug, Clone)]
pub struct CancelHandle(pub(crate) Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Outcome of one internal step, graph ownership included.
pub(crate) enum BuildStep {
    Pending,
    Done(RefGraph, BuildSummary),
    Cancelled,
}

/// A resumable indexing pass over an enumerated corpus.
///
/// The graph under construction lives here, unreachable by queries, until
/// the final step moves it out whole.
pub(crate) struct Build {
    nodes: Vec<Utf8PathBuf>,
    cursor: usize,
    skipped: usize,
    graph: RefGraph,
    cancel: Arc<AtomicBool>,
}

impl Build {
    pub(crate) fn new(nodes: Vec<Utf8PathBuf>, cancel: Arc<AtomicBool>) -> Self {
        Self {
            nodes,
            cursor: 0,
            skipped: 0,
            graph: RefGraph::new(),
            cancel,
        }
    }

    pub(crate) fn progress(&self) -> Progress {
        Progress {
            completed: self.cursor,
            total: self.nodes.len(),
        }
    }

    /// Resolves up to `batch` nodes, then yields.
    ///
    /// A node whose resolver call fails is logged and skipped; the pass
    /// carries on. On the last batch the finished graph is moved out.
    pub(crate) fn step(&mut self, resolver: &dyn Resolve, batch: usize) -> BuildStep {
        if self.cancel.load(Ordering::Relaxed) {
            tracing::info!(
                "Build cancelled after {} of {} assets, discarding partial graph",
                self.cursor,
                self.nodes.len(),
            );
            return BuildStep::Cancelled;
        }

        let end = self.nodes.len().min(self.cursor + batch.max(1));

        for node in &self.nodes[self.cursor..end] {
            match resolver.resolve(node) {
                Ok(references) => {
                    self.graph.touch(node);
                    for reference in &references {
                        self.graph.insert(node, reference);
                    }
                }
                Err(err) => {
                    tracing::warn!("Couldn't resolve references of '{node}': {err:#}");
                    self.skipped += 1;
                }
            }
        }

        self.cursor = end;

        if self.cursor == self.nodes.len() {
            let summary = BuildSummary {
                indexed: self.nodes.len() - self.skipped,
                skipped: self.skipped,
                total: self.nodes.len(),
            };
            BuildStep::Done(std::mem::take(&mut self.graph), summary)
        } else {
            BuildStep::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::anyhow;
    use camino::Utf8Path;

    use super::*;

    fn p(s: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(s)
    }

    fn corpus(n: usize) -> Vec<Utf8PathBuf> {
        (0..n).map(|i| p(&format!("asset{i:02}.prefab"))).collect()
    }

    fn table(edges: &[(&str, &[&str])]) -> impl Resolve {
        let map: HashMap<Utf8PathBuf, Vec<Utf8PathBuf>> = edges
            .iter()
            .map(|(from, to)| (p(from), to.iter().map(|t| p(t)).collect()))
            .collect();

        move |node: &Utf8Path| -> anyhow::Result<Vec<Utf8PathBuf>> {
            Ok(map.get(node).cloned().unwrap_or_default())
        }
    }

    fn flag() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn batches_bound_work_per_step() {
        let resolver = table(&[]);
        let mut build = Build::new(corpus(5), flag());

        assert!(matches!(build.step(&resolver, 2), BuildStep::Pending));
        assert_eq!(build.progress(), Progress { completed: 2, total: 5 });

        assert!(matches!(build.step(&resolver, 2), BuildStep::Pending));
        assert_eq!(build.progress(), Progress { completed: 4, total: 5 });

        match build.step(&resolver, 2) {
            BuildStep::Done(_, summary) => {
                assert_eq!(summary, BuildSummary { indexed: 5, skipped: 0, total: 5 });
            }
            _ => panic!("expected the pass to finish"),
        }
    }

    #[test]
    fn zero_batch_still_makes_progress() {
        let resolver = table(&[]);
        let mut build = Build::new(corpus(2), flag());

        assert!(matches!(build.step(&resolver, 0), BuildStep::Pending));
        assert_eq!(build.progress().completed, 1);
    }

    #[test]
    fn resolver_failure_skips_only_that_node() {
        let mut nodes = corpus(19);
        nodes.push(p("broken.prefab"));
        nodes.sort();

        let resolver = |node: &Utf8Path| -> anyhow::Result<Vec<Utf8PathBuf>> {
            if node.as_str() == "broken.prefab" {
                Err(anyhow!("unparseable asset"))
            } else {
                Ok(vec![p("shared.png")])
            }
        };

        let mut build = Build::new(nodes, flag());
        let (graph, summary) = loop {
            match build.step(&resolver, DEFAULT_BATCH) {
                BuildStep::Pending => continue,
                BuildStep::Done(graph, summary) => break (graph, summary),
                BuildStep::Cancelled => panic!("nothing requested cancellation"),
            }
        };

        assert_eq!(summary, BuildSummary { indexed: 19, skipped: 1, total: 20 });
        assert!(graph.dependencies("broken.prefab").is_none());
        assert_eq!(graph.referencers("shared.png").unwrap().len(), 19);
        assert!(
            !graph
                .referencers("shared.png")
                .unwrap()
                .contains(&p("broken.prefab"))
        );
    }

    #[test]
    fn cancellation_wins_over_remaining_batches() {
        let resolver = table(&[("asset00.prefab", &["t.png"])]);
        let cancel = flag();
        let mut build = Build::new(corpus(4), cancel.clone());

        assert!(matches!(build.step(&resolver, 1), BuildStep::Pending));
        CancelHandle(cancel).cancel();
        assert!(matches!(build.step(&resolver, 1), BuildStep::Cancelled));
    }

    #[test]
    fn reverse_order_follows_corpus_order() {
        let resolver = table(&[
            ("asset00.prefab", &["shared.png"]),
            ("asset01.prefab", &["shared.png"]),
            ("asset02.prefab", &["shared.png"]),
        ]);

        let mut build = Build::new(corpus(3), flag());
        let graph = loop {
            match build.step(&resolver, 2) {
                BuildStep::Pending => continue,
                BuildStep::Done(graph, _) => break graph,
                BuildStep::Cancelled => panic!("nothing requested cancellation"),
            }
        };

        assert_eq!(
            graph.referencers("shared.png").unwrap(),
            &[p("asset00.prefab"), p("asset01.prefab"), p("asset02.prefab")]
        );
    }
}
