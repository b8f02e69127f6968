//! Configuration for pomosync.
//!
//! Layered with figment: built-in defaults, then `~/.pomosync/config.toml`,
//! then `POMOSYNC_*` environment variables (nested keys split on `__`, e.g.
//! `POMOSYNC_REMOTE__BASE_URL`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::services::report::DEFAULT_RECENT_LIMIT;
use crate::services::{MarkSentPolicy, SessionStore};
use crate::types::{PomosyncError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    pub report: ReportConfig,
    pub user: UserConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `sessions.json` (default `~/.pomosync`)
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Document store base URL; unset means local-only
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub recent_limit: usize,
    pub mark_sent: MarkSentPolicy,
    /// Where rendered reports are dropped (default `<data_dir>/outbox`)
    pub outbox_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            mark_sent: MarkSentPolicy::default(),
            outbox_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Signed-in user id used when a command omits `--user`
    pub id: Option<String>,
}

impl Config {
    /// Load from the default config file and environment
    pub fn load() -> Result<Self> {
        let path = SessionStore::default_data_dir()?.join("config.toml");
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("POMOSYNC_").split("__"))
            .extract()
            .map_err(|e| PomosyncError::Config(e.to_string()))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => SessionStore::default_data_dir(),
        }
    }

    pub fn outbox_dir(&self) -> Result<PathBuf> {
        match &self.report.outbox_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.data_dir()?.join("outbox")),
        }
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs.max(1))
    }
}
