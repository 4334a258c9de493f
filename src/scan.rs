//! Corpus enumeration.
//!
//! Enumeration only produces candidate node paths; whether a candidate has
//! any references at all is discovered later, by the resolver.

use camino::{Utf8Path, Utf8PathBuf};
use glob::glob;

use crate::error::ScanError;

/// Lists the candidate assets to index under a corpus root.
///
/// Implementations must be deterministic: the builder processes nodes in
/// the returned order, and the reverse side of the graph records that
/// order, so a stable enumeration gives reproducible indexes.
pub trait Scan {
    fn list(&self, root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ScanError>;
}

/// A fixed list of nodes; handy when the host already knows the corpus.
impl Scan for Vec<Utf8PathBuf> {
    fn list(&self, _: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ScanError> {
        Ok(self.clone())
    }
}

/// Filesystem scanner matching glob patterns relative to the corpus root.
pub struct GlobScanner {
    patterns: Vec<String>,
}

impl GlobScanner {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Matches the corpus's composite assets, the usual entry points of a
    /// reference search.
    pub fn composites() -> Self {
        Self::new(["**/*.prefab"])
    }
}

impl Default for GlobScanner {
    fn default() -> Self {
        Self::composites()
    }
}

impl Scan for GlobScanner {
    fn list(&self, root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, ScanError> {
        if !root.exists() {
            tracing::warn!("Corpus root '{root}' does not exist, nothing to index");
            return Ok(vec![]);
        }

        let mut nodes = Vec::new();

        for pattern in &self.patterns {
            for entry in glob(root.join(pattern).as_str())? {
                let path = Utf8PathBuf::try_from(entry?)?;
                if path.is_file() {
                    nodes.push(path);
                }
            }
        }

        // Stable order regardless of filesystem iteration quirks, with
        // overlapping patterns collapsed.
        nodes.sort();
        nodes.dedup();

        Ok(nodes)
    }
}
