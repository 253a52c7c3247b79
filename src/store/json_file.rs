// src/store/json_file.rs

use crate::domain::history::History;
use crate::domain::snapshot::PropertyData;
use crate::store::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the cached last-seen snapshot list.
pub const BASELINE_FILE: &str = "previousPropertyData.json";

/// Where the history lives. Implementations own their I/O; callers decide
/// what to do when it fails.
pub trait HistoryStore {
    /// An absent store is an empty history, not an error.
    fn load(&self) -> Result<History, StoreError>;
    fn save(&self, history: &History) -> Result<(), StoreError>;
}

/// History persisted as a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<History, StoreError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, history: &History) -> Result<(), StoreError> {
        write_json(&self.path, history)?;
        debug!("💾 Wrote {} history entries to {}", history.len(), self.path.display());
        Ok(())
    }
}

/// The last snapshot list the dashboard showed, kept across restarts so a
/// fresh process can still report what changed. Never authoritative.
#[derive(Debug, Clone)]
pub struct BaselineCache {
    path: PathBuf,
}

impl BaselineCache {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(BASELINE_FILE),
        }
    }

    /// Unreadable caches are dropped with a warning.
    pub fn load(&self) -> Option<Vec<PropertyData>> {
        match read_json(&self.path) {
            Ok(found) => found,
            Err(e) => {
                warn!("⚠️ Ignoring snapshot cache {}: {e}", self.path.display());
                None
            }
        }
    }

    pub fn save(&self, snapshot: &[PropertyData]) -> Result<(), StoreError> {
        write_json(&self.path, &snapshot)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| StoreError::Io(format!("read {}: {e}", path.display())))?;

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))
}

/// Writes through a sibling temp file and renames it into place.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| StoreError::Io(format!("create {}: {e}", dir.display())))?;
    }

    let json =
        serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialize(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| StoreError::Io(format!("write {}: {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| StoreError::Io(format!("rename to {}: {e}", path.display())))?;

    Ok(())
}
