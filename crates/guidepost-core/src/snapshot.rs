//! Snapshot artifact persistence

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SearchResult;
use crate::types::Snapshot;

/// Load/save access to the flat JSON snapshot artifact.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a reader never observes a partially written artifact and a failed
/// build leaves any prior snapshot untouched.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and parse the artifact
    pub fn load(&self) -> SearchResult<Snapshot> {
        let data = fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&data)?;
        Ok(snapshot)
    }

    /// Persist `snapshot`, atomically replacing any prior artifact
    pub fn save(&self, snapshot: &Snapshot) -> SearchResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
