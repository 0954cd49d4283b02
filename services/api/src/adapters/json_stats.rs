//! services/api/src/adapters/json_stats.rs
//!
//! File-backed implementation of the `StatsStore` port. The aggregate and the
//! history window live as two pretty-printed JSON documents under a fixed
//! namespace directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;
use typespark_core::ports::{PortError, PortResult, StatsStore};
use typespark_core::{PersistedStats, SessionSummary};

/// Directory created under the configured data dir.
pub const NAMESPACE: &str = "typespark";

const STATS_FILE: &str = "stats.json";
const HISTORY_FILE: &str = "history.json";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Debug, Clone)]
pub struct JsonStatsStore {
    base_dir: PathBuf,
}

impl JsonStatsStore {
    /// Opens (creating if needed) the namespace directory under `data_dir`.
    pub fn open(data_dir: &Path) -> PortResult<Self> {
        let base_dir = data_dir.join(NAMESPACE);
        fs::create_dir_all(&base_dir).map_err(io_error)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing or unreadable files load as defaults so a corrupt file never blocks practice.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Discarding unreadable {}: {}", path.display(), e);
                T::default()
            }),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                T::default()
            }
        }
    }

    /// Writes through a temp file and a rename so readers never see a partial document.
    fn save<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> PortResult<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let mut file = fs::File::create(&tmp_path).map_err(io_error)?;
        file.write_all(json.as_bytes()).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;

        fs::rename(&tmp_path, &path).map_err(io_error)?;
        Ok(())
    }
}

fn io_error(e: std::io::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `StatsStore` Trait Implementation
//=========================================================================================

impl StatsStore for JsonStatsStore {
    fn load_stats(&self) -> PortResult<PersistedStats> {
        Ok(self.load(STATS_FILE))
    }

    fn save_stats(&self, stats: &PersistedStats) -> PortResult<()> {
        self.save(STATS_FILE, stats)
    }

    fn load_history(&self) -> PortResult<Vec<SessionSummary>> {
        Ok(self.load(HISTORY_FILE))
    }

    fn save_history(&self, history: &[SessionSummary]) -> PortResult<()> {
        self.save(HISTORY_FILE, history)
    }
}
