//! On-disk persistence of the reference graph.
//!
//! Only the reverse side goes to disk, as a pretty-printed JSON list of
//! `{key, values}` records: one record per referenced asset, keys in
//! case-insensitive order, values in processing order. The file is
//! human-diffable and lives at the project root, outside the scanned
//! corpus. The forward side is rebuilt by inversion on load.
//!
//! Writes go through a temp-file-then-rename so a failed save never
//! clobbers the previous cache file. An unreadable file is renamed to a
//! quarantine name, so the next session starts cold instead of tripping
//! over the same bytes again.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::graph::RefGraph;

/// Default cache file name, placed at the project root next to the corpus.
pub const DEFAULT_CACHE_FILE: &str = ".tsunagi.json";

/// One persisted reverse entry: an asset and everything referencing it.
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    key: Utf8PathBuf,
    values: Vec<Utf8PathBuf>,
}

/// Reads and writes the persisted reference cache at a fixed path.
pub struct Store {
    path: Utf8PathBuf,
}

impl Store {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Serializes the reverse side of `graph` to the cache file.
    pub fn save(&self, graph: &RefGraph) -> Result<(), StoreError> {
        let records: Vec<Record> = graph
            .reverse_entries()
            .into_iter()
            .map(|(key, values)| Record {
                key: key.clone(),
                values: values.to_vec(),
            })
            .collect();

        let json = serde_json::to_string_pretty(&records)?;

        let temp = Utf8PathBuf::from(format!("{}.tmp", self.path));
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        tracing::debug!("Saved {} reverse entries to {}", records.len(), self.path);

        Ok(())
    }

    /// Reads the cache file back and reconstructs the full graph.
    ///
    /// A missing file is a normal cold start and comes back as `Ok(None)`.
    /// A file that exists but cannot be parsed is quarantined and reported
    /// as [`StoreError::Corrupt`]; callers treat that the same as a cold
    /// start and rebuild.
    pub fn load(&self) -> Result<Option<RefGraph>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };

        let records: Vec<Record> = match serde_json::from_str(&text) {
            Ok(records) => records,
            Err(err) => {
                self.quarantine();
                return Err(StoreError::Corrupt {
                    path: self.path.clone(),
                    reason: err.to_string(),
                });
            }
        };

        let graph = RefGraph::from_reverse(
            records.into_iter().map(|record| (record.key, record.values)),
        );

        Ok(Some(graph))
    }

    fn quarantine(&self) {
        let target = Utf8PathBuf::from(format!("{}.corrupt", self.path));
        match fs::rename(&self.path, &target) {
            Ok(()) => tracing::warn!("Quarantined unreadable cache file as '{target}'"),
            Err(err) => {
                tracing::warn!("Couldn't quarantine cache file '{}': {err}", self.path);
            }
        }
    }
}
