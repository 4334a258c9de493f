//! The dependency resolution seam.

use camino::{Utf8Path, Utf8PathBuf};

/// Computes the immediate outgoing references of a single asset.
///
/// Implementations come from the host asset system and are opaque to the
/// index: a call may be slow, and it may fail for an individual node. The
/// builder contains such failures by logging them and counting the node
/// as skipped, so one broken asset never aborts a whole pass.
///
/// Any `Fn(&Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>>` closure can be
/// used directly as a resolver.
pub trait Resolve {
    fn resolve(&self, node: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>>;
}

impl<F> Resolve for F
where
    F: Fn(&Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>>,
{
    fn resolve(&self, node: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
        self(node)
    }
}
