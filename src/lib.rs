#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod build;
mod classify;
mod error;
mod graph;
mod query;
mod resolve;
mod scan;
mod store;

use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::build::{Build, BuildStep};
pub use crate::build::{BuildOutcome, BuildSummary, CancelHandle, DEFAULT_BATCH, Progress, StepStatus};
pub use crate::classify::Category;
pub use crate::error::{IndexError, ScanError, StoreError};
pub use crate::graph::RefGraph;
pub use crate::query::{QueryResult, query};
pub use crate::resolve::Resolve;
pub use crate::scan::{GlobScanner, Scan};
pub use crate::store::{DEFAULT_CACHE_FILE, Store};

const ANSI_BLUE: Style = Style::new().blue();

fn as_overhead(s: Instant) -> impl Display {
    let f = format!("(+{}ms)", s.elapsed().as_millis());
    ANSI_BLUE.apply_to(f)
}

/// Installs a `tracing` subscriber reading its filter from `RUST_LOG`.
#[cfg(feature = "logging")]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

/// The reference index over one asset corpus.
///
/// An `Index` owns the committed graph, the cache file, and at most one
/// in-flight build at a time. The lifecycle is explicit:
///
/// 1. construct via [`Index::config`],
/// 2. either [`load`](Index::load) the cache file or build, with
///    [`run`](Index::run) or batch by batch through
///    [`start`](Index::start) / [`step`](Index::step),
/// 3. [`query`](Index::query) as often as needed,
/// 4. rebuild whenever the corpus changed; the old graph keeps serving
///    queries until the rebuild commits.
///
/// There is no partial refresh: a rebuild replaces the graph wholesale,
/// and a cancelled build leaves the previously committed graph untouched.
pub struct Index {
    root: Utf8PathBuf,
    scanner: Box<dyn Scan>,
    resolver: Box<dyn Resolve>,
    store: Store,
    batch: usize,
    cancel: Arc<AtomicBool>,
    cache: Option<RefGraph>,
    active: Option<Build>,
}

impl Index {
    /// Starts configuring an index over the corpus at `root`.
    pub fn config(root: impl Into<Utf8PathBuf>) -> Config {
        Config {
            root: root.into(),
            scanner: Box::new(GlobScanner::composites()),
            store: Store::new(DEFAULT_CACHE_FILE),
            batch: DEFAULT_BATCH,
        }
    }

    /// Whether a committed graph is available to queries.
    pub fn initialized(&self) -> bool {
        self.cache.is_some()
    }

    /// Whether a build is currently in flight.
    pub fn building(&self) -> bool {
        self.active.is_some()
    }

    /// The committed graph, once one exists.
    pub fn graph(&self) -> Option<&RefGraph> {
        self.cache.as_ref()
    }

    /// Begins a new build: enumerates the corpus and fixes the work total.
    ///
    /// Only one build may be active at a time; starting another one is
    /// rejected. An empty corpus needs no driving at all: the index
    /// commits an empty graph right here and stays idle.
    pub fn start(&mut self) -> Result<(), IndexError> {
        if self.active.is_some() {
            return Err(IndexError::BuildActive);
        }

        let nodes = self.scanner.list(&self.root)?;
        self.cancel.store(false, Ordering::Relaxed);

        if nodes.is_empty() {
            tracing::info!("No assets found under '{}'", self.root);
            self.commit(RefGraph::new());
            return Ok(());
        }

        tracing::info!("Indexing {} assets under '{}'", nodes.len(), self.root);
        self.active = Some(Build::new(nodes, self.cancel.clone()));

        Ok(())
    }

    /// Drives the active build by one batch.
    ///
    /// Queries issued between steps keep reading the previously committed
    /// graph; the one under construction becomes visible only through the
    /// final `Done` step, which also persists it. A failed save is logged
    /// and the in-memory graph stays authoritative for the session.
    pub fn step(&mut self) -> Result<StepStatus, IndexError> {
        let Some(build) = self.active.as_mut() else {
            return Err(IndexError::NoBuild);
        };

        match build.step(self.resolver.as_ref(), self.batch) {
            BuildStep::Pending => {
                let progress = build.progress();
                Ok(StepStatus::Pending(progress))
            }
            BuildStep::Done(graph, summary) => {
                self.active = None;
                self.commit(graph);
                tracing::info!(
                    "Indexed {} assets, skipped {}",
                    summary.indexed,
                    summary.skipped,
                );
                Ok(StepStatus::Done(summary))
            }
            BuildStep::Cancelled => {
                self.active = None;
                Ok(StepStatus::Cancelled)
            }
        }
    }

    /// Requests cancellation of the active build, if any.
    ///
    /// Takes effect at the next [`step`](Index::step), which discards the
    /// partial graph entirely rather than leaving it queryable.
    pub fn cancel(&mut self) {
        if self.active.is_some() {
            self.cancel.store(true, Ordering::Relaxed);
        }
    }

    /// A handle for requesting cancellation from another thread, checked
    /// at batch boundaries like [`cancel`](Index::cancel).
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel.clone())
    }

    /// Progress of the active build, if one is in flight.
    pub fn progress(&self) -> Option<Progress> {
        self.active.as_ref().map(Build::progress)
    }

    /// Runs a full build to its end, with a progress bar on stderr.
    pub fn run(&mut self) -> Result<BuildOutcome, IndexError> {
        let s = Instant::now();
        self.start()?;

        let Some(progress) = self.progress() else {
            // Empty corpus; start() already committed an empty graph.
            let summary = BuildSummary { indexed: 0, skipped: 0, total: 0 };
            return Ok(BuildOutcome::Completed(summary));
        };

        let bar = ProgressBar::new(progress.total as u64).with_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Error setting progress bar template")
                .progress_chars("#>-"),
        );
        bar.set_message("Indexing references");

        loop {
            match self.step()? {
                StepStatus::Pending(progress) => bar.set_position(progress.completed as u64),
                StepStatus::Done(summary) => {
                    bar.finish_with_message(format!(
                        "Indexed {} assets {}",
                        summary.indexed,
                        as_overhead(s)
                    ));
                    return Ok(BuildOutcome::Completed(summary));
                }
                StepStatus::Cancelled => {
                    bar.abandon_with_message("Cancelled");
                    return Ok(BuildOutcome::Cancelled);
                }
            }
        }
    }

    /// Adopts the cache file instead of building, when one is readable.
    ///
    /// Returns whether the index is initialized afterwards. A missing file
    /// is a quiet cold start; an unreadable one is reported (and shoved
    /// aside by the store) before falling back to a rebuild by the caller.
    pub fn load(&mut self) -> bool {
        match self.store.load() {
            Ok(Some(graph)) => {
                tracing::info!("Loaded reference cache from '{}'", self.store.path());
                self.cache = Some(graph);
                true
            }
            Ok(None) => {
                tracing::debug!("No reference cache at '{}'", self.store.path());
                false
            }
            Err(err) => {
                tracing::warn!("Discarding unreadable reference cache: {err}");
                false
            }
        }
    }

    /// Looks up both directions of the committed graph for `target`.
    ///
    /// Before any build or load this answers with empty results, the same
    /// as for a node simply absent from the graph.
    pub fn query(&self, target: impl AsRef<Utf8Path>) -> QueryResult {
        match &self.cache {
            Some(graph) => query::query(graph, target),
            None => QueryResult::default(),
        }
    }

    fn commit(&mut self, graph: RefGraph) {
        if let Err(err) = self.store.save(&graph) {
            tracing::warn!("Couldn't persist the reference cache: {err}");
        }
        self.cache = Some(graph);
    }
}

/// A builder struct for creating an [`Index`] with specified settings.
pub struct Config {
    root: Utf8PathBuf,
    scanner: Box<dyn Scan>,
    store: Store,
    batch: usize,
}

impl Config {
    /// Replaces the default composite-asset scanner.
    pub fn scanner(mut self, scanner: impl Scan + 'static) -> Self {
        self.scanner = Box::new(scanner);
        self
    }

    /// Moves the cache file away from [`DEFAULT_CACHE_FILE`]. The file
    /// should live outside the scanned corpus.
    pub fn cache_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.store = Store::new(path);
        self
    }

    /// Bounds the number of assets resolved per build step.
    pub fn batch(mut self, nodes: usize) -> Self {
        self.batch = nodes.max(1);
        self
    }

    pub fn finish(self, resolver: impl Resolve + 'static) -> Index {
        Index {
            root: self.root,
            scanner: self.scanner,
            resolver: Box::new(resolver),
            store: self.store,
            batch: self.batch,
            cancel: Arc::new(AtomicBool::new(false)),
            cache: None,
            active: None,
        }
    }
}
