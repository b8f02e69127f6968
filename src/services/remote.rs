//! Remote session repository
//!
//! Per-user remote collection at `/users/{userId}/sessions/{sessionId}` plus
//! the preferences document at `/users/{userId}`. Writes are keyed by
//! session id, so repeating a put or delete has no further effect.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::types::{PomosyncError, Result, SessionRecord, UserPreferences};

/// Default bound on any single remote call
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Repository name for logging (e.g., "http", "memory")
    fn name(&self) -> &str;

    /// All sessions stored for `user_id`
    async fn fetch_all(&self, user_id: &str) -> Result<Vec<SessionRecord>>;

    /// Create or overwrite the document keyed by `record.id`
    async fn put(&self, user_id: &str, record: &SessionRecord) -> Result<()>;

    /// Remove the document; deleting a missing id succeeds
    async fn delete(&self, user_id: &str, session_id: &str) -> Result<()>;

    async fn fetch_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>>;

    async fn put_preferences(&self, preferences: &UserPreferences) -> Result<()>;
}

/// Run a remote call, converting a hang into `TransientNetwork`.
pub async fn bounded<T, F>(limit: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(PomosyncError::TransientNetwork(format!(
            "{} timed out after {}s",
            operation,
            limit.as_secs()
        ))),
    }
}

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<String, BTreeMap<String, SessionRecord>>,
    preferences: HashMap<String, UserPreferences>,
}

/// In-process repository, used for local development and tests.
///
/// Can be switched offline to exercise the best-effort sync paths.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `records` for `user_id`
    pub fn with_sessions(user_id: &str, records: Vec<SessionRecord>) -> Self {
        let repo = Self::new();
        {
            let mut state = repo.lock();
            let user = state.sessions.entry(user_id.to_string()).or_default();
            for record in records {
                user.insert(record.id.clone(), record);
            }
        }
        repo
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of session puts and deletes served so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of one user's remote sessions, ordered by id
    pub fn sessions_for(&self, user_id: &str) -> Vec<SessionRecord> {
        self.lock()
            .sessions
            .get(user_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PomosyncError::TransientNetwork(
                "memory repository is offline".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryRepository {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_all(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
        self.ensure_online()?;
        Ok(self.sessions_for(user_id))
    }

    async fn put(&self, user_id: &str, record: &SessionRecord) -> Result<()> {
        self.ensure_online()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .sessions
            .entry(user_id.to_string())
            .or_default()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str, session_id: &str) -> Result<()> {
        self.ensure_online()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(user) = self.lock().sessions.get_mut(user_id) {
            user.remove(session_id);
        }
        Ok(())
    }

    async fn fetch_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        self.ensure_online()?;
        Ok(self.lock().preferences.get(user_id).cloned())
    }

    async fn put_preferences(&self, preferences: &UserPreferences) -> Result<()> {
        self.ensure_online()
            .map_err(|e| PomosyncError::PreferenceUpdate(e.to_string()))?;
        self.lock()
            .preferences
            .insert(preferences.user_id.clone(), preferences.clone());
        Ok(())
    }
}
