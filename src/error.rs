use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors surfaced by the [`Index`](crate::Index) orchestration layer.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("A build is already in progress")]
    BuildActive,

    #[error("No build is in progress")]
    NoBuild,

    #[error("Couldn't enumerate the corpus.\n{0}")]
    Scan(#[from] ScanError),
}

/// Errors raised while enumerating candidate assets under the corpus root.
///
/// A missing root is deliberately not represented here; the scanner reports
/// it as a diagnostic and returns an empty corpus instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Couldn't compile glob pattern.\n{0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Couldn't run glob.\n{0}")]
    Glob(#[from] glob::GlobError),

    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),
}

/// Errors raised while reading or writing the persisted reference cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Couldn't access the cache file.\n{0}")]
    Io(#[from] std::io::Error),

    #[error("Couldn't encode the cache.\n{0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cache file '{path}' is unreadable: {reason}")]
    Corrupt { path: Utf8PathBuf, reason: String },
}
