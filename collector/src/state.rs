//! # State Store
//!
//! Keeps the summary of the last refresh cycle so the next one can report
//! what changed. History is a convenience: a store that cannot load behaves
//! like an empty one and a failed save is logged and forgotten.

use crate::metrics::CampaignSummary;
use eyre::{
    Context as _,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    sync::Mutex,
};

pub trait StateStore: Send + Sync {
    /// The previously saved summary, or `None` when there is no usable history.
    fn load(&self) -> Option<CampaignSummary>;

    /// Replaces the saved summary. Never fails from the caller's point of view.
    fn save(&self, summary: &CampaignSummary);
}

/// On-disk layout of the state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub timestamp: i64,
    #[serde(default)]
    pub summary: CampaignSummary,
}

/// JSON state file at a fixed path, overwritten wholesale on every save.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<PersistedState> {
        let content = std::fs::read_to_string(&self.path)
            .wrap_err_with(|| format!("Failed to read state from {:?}", self.path))?;
        serde_json::from_str(&content).wrap_err_with(|| format!("Failed to deserialize state from {:?}", self.path))
    }

    fn write(&self, summary: &CampaignSummary) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let state = PersistedState {
            timestamp: chrono::Utc::now().timestamp(),
            summary: summary.clone(),
        };
        let content = serde_json::to_string_pretty(&state).context("Failed to serialize state")?;
        std::fs::write(&self.path, content).wrap_err_with(|| format!("Failed to write state to {:?}", self.path))
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Option<CampaignSummary> {
        match self.read() {
            Ok(state) => {
                debug!(path = ?self.path, saved_at = state.timestamp, "Loaded previous state");
                Some(state.summary)
            }
            Err(e) => {
                debug!(error = %e, "Could not load previous state");
                None
            }
        }
    }

    fn save(&self, summary: &CampaignSummary) {
        match self.write(summary) {
            Ok(()) => debug!(path = ?self.path, "Saved current state"),
            Err(e) => error!(error = ?e, "Could not save state"),
        }
    }
}

/// Keeps the summary in memory only.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    summary: Mutex<Option<CampaignSummary>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(summary: CampaignSummary) -> Self {
        Self {
            summary: Mutex::new(Some(summary)),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Option<CampaignSummary> {
        self.summary.lock().ok().and_then(|guard| guard.clone())
    }

    fn save(&self, summary: &CampaignSummary) {
        if let Ok(mut guard) = self.summary.lock() {
            *guard = Some(summary.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    fn summary() -> CampaignSummary {
        CampaignSummary {
            total_fuzzers: 3,
            alive_fuzzers: 2,
            dead_fuzzers: 1,
            total_execs: 123_456_789,
            total_speed: 2_345.75,
            avg_speed_per_core: 1_172.875,
            max_coverage: 12.5,
            avg_stability: 97.25,
            min_stability: 95.5,
            max_stability: 99.0,
            total_crashes: 5,
            new_crashes: 3,
            last_find_time: 1_700_000_000,
            max_cycle: 42,
            avg_cycle: 21.5,
            cycles_wo_finds: "3/0/12".to_string(),
            total_cpu_usage: 187.5,
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_is_no_history() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FileStateStore::new(dir.child("state.json")).load(), None);
    }

    #[test]
    fn corrupt_file_is_no_history() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(FileStateStore::new(&path).load(), None);
    }

    #[test]
    fn round_trip_preserves_summary() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.child("nested").join("state.json"));
        store.save(&summary());
        assert_eq!(store.load(), Some(summary()));
    }

    #[test]
    fn save_overwrites_previous_state() {
        let dir = TempDir::new().unwrap();
        let store = FileStateStore::new(dir.child("state.json"));
        store.save(&summary());
        let next = CampaignSummary {
            total_crashes: 8,
            ..summary()
        };
        store.save(&next);
        assert_eq!(store.load().unwrap().total_crashes, 8);
    }

    #[test]
    fn older_state_without_summary_fields_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("state.json");
        std::fs::write(&path, r#"{"timestamp": 1700000000, "summary": {"total_crashes": 2}}"#).unwrap();
        let loaded = FileStateStore::new(&path).load().unwrap();
        assert_eq!(loaded.total_crashes, 2);
        assert_eq!(loaded.total_hangs, 0);
    }

    #[test]
    fn unwritable_path_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.child("file"), "").unwrap();
        let store = FileStateStore::new(dir.child("file").join("state.json"));
        store.save(&summary());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStateStore::new();
        assert_eq!(store.load(), None);
        store.save(&summary());
        assert_eq!(store.load(), Some(summary()));
    }
}
