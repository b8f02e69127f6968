//! Local session store
//!
//! Persists the whole session collection as a single JSON array under a
//! fixed storage key. Reads never fail: missing or corrupt data is a
//! recoverable cache and loads as an empty collection.

use crate::types::{PomosyncError, Result, SessionRecord, StoreWarning};
use directories::BaseDirs;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fixed storage key of the session blob
pub const STORAGE_KEY: &str = "sessions";

pub struct SessionStore {
    data_dir: PathBuf,
}

impl SessionStore {
    /// Store rooted at `~/.pomosync`
    pub fn new() -> Result<Self> {
        let dir = Self::default_data_dir()?;
        fs::create_dir_all(&dir)?;
        Ok(Self { data_dir: dir })
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn default_data_dir() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| PomosyncError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".pomosync"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", STORAGE_KEY))
    }

    /// Load the stored collection; empty on missing or unreadable data.
    pub fn load(&self) -> Vec<SessionRecord> {
        let (sessions, warning) = self.load_with_warning();
        if let Some(warning) = warning {
            let error = PomosyncError::from(warning);
            warn!(error = %error, "session store unreadable, starting empty");
        }
        sessions
    }

    /// Like [`load`](Self::load) but also reports why data was discarded.
    /// Uses shared file lock for concurrent read safety.
    pub fn load_with_warning(&self) -> (Vec<SessionRecord>, Option<StoreWarning>) {
        let path = self.store_path();
        if !path.exists() {
            return (Vec::new(), None);
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                return (
                    Vec::new(),
                    Some(StoreWarning::LoadFailed(format!(
                        "Failed to open session store: {}",
                        e
                    ))),
                );
            }
        };

        if let Err(e) = file.lock_shared() {
            return (
                Vec::new(),
                Some(StoreWarning::LoadFailed(format!(
                    "Failed to acquire read lock: {}",
                    e
                ))),
            );
        }

        let mut content = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut content) {
            let _ = file.unlock();
            return (
                Vec::new(),
                Some(StoreWarning::LoadFailed(format!(
                    "Failed to read session store: {}",
                    e
                ))),
            );
        }
        let _ = file.unlock();

        match serde_json::from_str::<Vec<SessionRecord>>(&content) {
            Ok(sessions) => {
                debug!(count = sessions.len(), "loaded local sessions");
                (sessions, None)
            }
            Err(e) => (
                Vec::new(),
                Some(StoreWarning::Corrupted(format!(
                    "Corrupted session store: {}",
                    e
                ))),
            ),
        }
    }

    /// Replace the stored collection. Atomic write (temp file + rename) with
    /// exclusive lock, so no reader sees a half-written snapshot.
    pub fn save(&self, sessions: &[SessionRecord]) -> Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            PomosyncError::StorageWrite(format!(
                "Failed to create {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;

        let content = serde_json::to_string_pretty(sessions)
            .map_err(|e| PomosyncError::Serialization(format!("Serialization failed: {}", e)))?;

        let path = self.store_path();
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path).map_err(|e| {
                PomosyncError::StorageWrite(format!("Failed to create temp file: {}", e))
            })?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        target.lock_exclusive()?;

        let renamed = fs::rename(&temp_path, &path);
        let _ = target.unlock();
        renamed?;

        debug!(count = sessions.len(), "saved local sessions");
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.store_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
