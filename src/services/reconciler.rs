//! Session reconciliation between the local store and the remote repository
//!
//! Merging is keyed by session id: local ∪ remote with local winning on
//! conflict. Records missing remotely are pushed, records missing locally
//! are pulled. Sync is best-effort and never blocks local functionality.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::remote::{bounded, SessionRepository, DEFAULT_REMOTE_TIMEOUT};
use super::SessionStore;
use crate::types::{PomosyncError, Result, SessionRecord, UserContext};

/// Outcome of the pure merge step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Deduplicated union, newest first
    pub merged: Vec<SessionRecord>,
    /// Local records the remote does not have yet
    pub to_push: Vec<SessionRecord>,
    /// Number of remote records added to the local collection
    pub pulled: usize,
    /// Ids present on both sides with different content
    pub divergent: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Merged with the remote collection
    Synced,
    /// Remote fetch failed; local collection returned unchanged
    Skipped(String),
    /// No signed-in user
    LocalOnly,
}

#[derive(Debug)]
pub struct PushFailure {
    pub session_id: String,
    pub error: PomosyncError,
}

#[derive(Debug)]
pub struct SyncReport {
    pub sessions: Vec<SessionRecord>,
    pub status: SyncStatus,
    pub pulled: usize,
    pub pushed: usize,
    /// Pushes that failed; the records stay local and retry next pass
    pub push_failures: Vec<PushFailure>,
    pub divergent: Vec<String>,
    /// Whether the merged snapshot reached the local store
    pub persisted: bool,
}

impl SyncReport {
    /// Persist `sessions` without touching the remote
    pub fn local_only(store: &SessionStore, sessions: Vec<SessionRecord>) -> Self {
        let persisted = match store.save(&sessions) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist local sessions");
                false
            }
        };
        Self {
            persisted,
            ..Self::unchanged(sessions, SyncStatus::LocalOnly)
        }
    }

    fn unchanged(sessions: Vec<SessionRecord>, status: SyncStatus) -> Self {
        Self {
            sessions,
            status,
            pulled: 0,
            pushed: 0,
            push_failures: Vec::new(),
            divergent: Vec::new(),
            persisted: false,
        }
    }
}

/// Result of deleting a selection of sessions
#[derive(Debug)]
pub struct DeleteOutcome {
    /// The collection after removal (already persisted)
    pub sessions: Vec<SessionRecord>,
    pub removed: Vec<String>,
    /// Background remote deletes, resolving to the number that failed.
    /// Dropping the handle detaches the task.
    pub remote: Option<JoinHandle<usize>>,
}

/// Deterministic collection order: timestamp descending, then id
pub fn sort_sessions(sessions: &mut [SessionRecord]) {
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
}

/// Split `sessions` into those kept and the ids removed by `selection`
pub fn remove_selected(
    sessions: Vec<SessionRecord>,
    selection: &HashSet<String>,
) -> (Vec<SessionRecord>, Vec<String>) {
    let mut removed = Vec::new();
    let kept = sessions
        .into_iter()
        .filter(|s| {
            if selection.contains(&s.id) {
                removed.push(s.id.clone());
                false
            } else {
                true
            }
        })
        .collect();
    (kept, removed)
}

pub struct Reconciler {
    repository: Arc<dyn SessionRepository>,
    timeout: Duration,
}

impl Reconciler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self {
            repository,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn repository(&self) -> &Arc<dyn SessionRepository> {
        &self.repository
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Merge `local` and `remote` by id. Pure; no I/O.
    pub fn merge(local: &[SessionRecord], remote: &[SessionRecord]) -> MergePlan {
        let remote_by_id: HashMap<&str, &SessionRecord> =
            remote.iter().map(|r| (r.id.as_str(), r)).collect();

        let mut merged: HashMap<String, SessionRecord> =
            HashMap::with_capacity(local.len() + remote.len());
        let mut to_push = Vec::new();
        let mut divergent = Vec::new();

        for record in local {
            if merged.contains_key(&record.id) {
                continue;
            }
            match remote_by_id.get(record.id.as_str()) {
                Some(remote_copy) if !record.same_content(remote_copy) => {
                    warn!(
                        session_id = %record.id,
                        "same session id with different content locally and remotely, keeping local copy"
                    );
                    divergent.push(record.id.clone());
                }
                Some(_) => {}
                None => to_push.push(record.clone()),
            }
            merged.insert(record.id.clone(), record.clone());
        }

        let mut pulled = 0;
        for record in remote {
            if !merged.contains_key(&record.id) {
                merged.insert(record.id.clone(), record.clone());
                pulled += 1;
            }
        }

        let mut merged: Vec<SessionRecord> = merged.into_values().collect();
        sort_sessions(&mut merged);
        sort_sessions(&mut to_push);

        MergePlan {
            merged,
            to_push,
            pulled,
            divergent,
        }
    }

    /// Pull, merge, persist, then push what the remote is missing.
    ///
    /// A failed fetch returns `local` unchanged. Push failures are collected
    /// and never abort the merge. The merged snapshot is saved before any
    /// push, and pushes are skipped if that save fails.
    pub async fn reconcile(
        &self,
        store: &SessionStore,
        local: Vec<SessionRecord>,
        user: Option<&UserContext>,
    ) -> SyncReport {
        let Some(user) = user else {
            return SyncReport::local_only(store, local);
        };

        let remote = match bounded(
            self.timeout,
            "fetch sessions",
            self.repository.fetch_all(&user.user_id),
        )
        .await
        {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, repository = self.repository.name(), "sync skipped");
                return SyncReport::unchanged(local, SyncStatus::Skipped(e.to_string()));
            }
        };

        let plan = Self::merge(&local, &remote);
        debug!(
            local = local.len(),
            remote = remote.len(),
            merged = plan.merged.len(),
            "merged session collections"
        );

        let persisted = match store.save(&plan.merged) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to persist merged sessions, deferring pushes");
                false
            }
        };

        let (pushed, push_failures) = if persisted {
            self.push_all(user, &plan.to_push).await
        } else {
            (0, Vec::new())
        };

        info!(
            pulled = plan.pulled,
            pushed,
            failed = push_failures.len(),
            "sync complete"
        );

        SyncReport {
            sessions: plan.merged,
            status: SyncStatus::Synced,
            pulled: plan.pulled,
            pushed,
            push_failures,
            divergent: plan.divergent,
            persisted,
        }
    }

    /// Push records concurrently, tagged with the owning user.
    /// Returns the number pushed and the failures.
    pub async fn push_all(
        &self,
        user: &UserContext,
        records: &[SessionRecord],
    ) -> (usize, Vec<PushFailure>) {
        let pushes = records.iter().map(|record| {
            let tagged = record.owned_by(&user.user_id);
            async move {
                let result = bounded(
                    self.timeout,
                    "put session",
                    self.repository.put(&user.user_id, &tagged),
                )
                .await;
                (tagged.id, result)
            }
        });

        let mut pushed = 0;
        let mut failures = Vec::new();
        for (session_id, result) in join_all(pushes).await {
            match result {
                Ok(()) => pushed += 1,
                Err(error) => {
                    warn!(session_id = %session_id, error = %error, "push failed, will retry next sync");
                    failures.push(PushFailure { session_id, error });
                }
            }
        }
        (pushed, failures)
    }

    /// Remove `selection` locally, persist, then delete remotely in the
    /// background. A remote delete that fails lets the record come back on
    /// the next pull.
    pub async fn delete(
        &self,
        store: &SessionStore,
        local: Vec<SessionRecord>,
        selection: &HashSet<String>,
        user: Option<&UserContext>,
    ) -> Result<DeleteOutcome> {
        let (sessions, removed) = remove_selected(local, selection);
        store.save(&sessions)?;

        let remote = match user {
            Some(user) if !removed.is_empty() => Some(self.spawn_deletes(user, removed.clone())),
            _ => None,
        };

        Ok(DeleteOutcome {
            sessions,
            removed,
            remote,
        })
    }

    fn spawn_deletes(&self, user: &UserContext, ids: Vec<String>) -> JoinHandle<usize> {
        let repository = Arc::clone(&self.repository);
        let timeout = self.timeout;
        let user_id = user.user_id.clone();

        tokio::spawn(async move {
            let deletes = ids.iter().map(|id| {
                let repository = Arc::clone(&repository);
                let user_id = user_id.as_str();
                async move {
                    let result =
                        bounded(timeout, "delete session", repository.delete(user_id, id)).await;
                    if let Err(e) = &result {
                        warn!(session_id = %id, error = %e, "remote delete failed");
                    }
                    result.is_err()
                }
            });
            join_all(deletes).await.into_iter().filter(|failed| *failed).count()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::remote::MemoryRepository;
    use crate::types::{SessionKind, UserPreferences};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn make_record(id: &str, day: u32, kind: SessionKind, minutes: u32) -> SessionRecord {
        SessionRecord {
            id: id.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            duration_minutes: minutes,
            kind,
            owner_id: None,
        }
    }

    fn ids(sessions: &[SessionRecord]) -> HashSet<String> {
        sessions.iter().map(|s| s.id.clone()).collect()
    }

    fn create_test_store() -> (SessionStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::with_data_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    /// Delegates to a memory repository but rejects puts for chosen ids
    struct FlakyRepository {
        inner: MemoryRepository,
        reject: HashSet<String>,
        put_attempts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SessionRepository for FlakyRepository {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch_all(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
            self.inner.fetch_all(user_id).await
        }

        async fn put(&self, user_id: &str, record: &SessionRecord) -> Result<()> {
            self.put_attempts.lock().unwrap().push(record.id.clone());
            if self.reject.contains(&record.id) {
                return Err(PomosyncError::RemoteWrite("rejected".into()));
            }
            self.inner.put(user_id, record).await
        }

        async fn delete(&self, user_id: &str, session_id: &str) -> Result<()> {
            self.inner.delete(user_id, session_id).await
        }

        async fn fetch_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>> {
            self.inner.fetch_preferences(user_id).await
        }

        async fn put_preferences(&self, preferences: &UserPreferences) -> Result<()> {
            self.inner.put_preferences(preferences).await
        }
    }

    /// Never answers fetches
    struct HangingRepository;

    #[async_trait]
    impl SessionRepository for HangingRepository {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn fetch_all(&self, _user_id: &str) -> Result<Vec<SessionRecord>> {
            std::future::pending().await
        }

        async fn put(&self, _user_id: &str, _record: &SessionRecord) -> Result<()> {
            std::future::pending().await
        }

        async fn delete(&self, _user_id: &str, _session_id: &str) -> Result<()> {
            std::future::pending().await
        }

        async fn fetch_preferences(&self, _user_id: &str) -> Result<Option<UserPreferences>> {
            std::future::pending().await
        }

        async fn put_preferences(&self, _preferences: &UserPreferences) -> Result<()> {
            std::future::pending().await
        }
    }

    // ========== merge() tests ==========

    #[test]
    fn test_merge_dedup_count() {
        let local = vec![
            make_record("1", 10, SessionKind::Work, 25),
            make_record("2", 11, SessionKind::Work, 25),
            make_record("3", 12, SessionKind::Work, 25),
        ];
        let remote = vec![
            make_record("2", 11, SessionKind::Work, 25),
            make_record("3", 12, SessionKind::Work, 25),
            make_record("4", 13, SessionKind::Work, 25),
            make_record("5", 14, SessionKind::Work, 25),
        ];

        let plan = Reconciler::merge(&local, &remote);

        // |L| + |R| - N common
        assert_eq!(plan.merged.len(), 3 + 4 - 2);
        assert_eq!(plan.pulled, 2);
        assert_eq!(ids(&plan.to_push), ids(&[local[0].clone()]));
    }

    #[test]
    fn test_merge_no_loss() {
        let local = vec![
            make_record("a", 10, SessionKind::Work, 25),
            make_record("b", 11, SessionKind::ShortBreak, 5),
        ];
        let remote = vec![
            make_record("c", 9, SessionKind::LongBreak, 15),
            make_record("b", 11, SessionKind::ShortBreak, 5),
        ];

        let plan = Reconciler::merge(&local, &remote);
        let merged = ids(&plan.merged);

        assert!(local.iter().all(|s| merged.contains(&s.id)));
        assert!(remote.iter().all(|s| merged.contains(&s.id)));
        let union: HashSet<String> = ids(&local).union(&ids(&remote)).cloned().collect();
        assert_eq!(plan.merged.len(), union.len());
    }

    #[test]
    fn test_merge_is_commutative_as_a_set() {
        let left = vec![
            make_record("a", 10, SessionKind::Work, 25),
            make_record("b", 11, SessionKind::ShortBreak, 5),
        ];
        let right = vec![
            make_record("b", 11, SessionKind::ShortBreak, 5),
            make_record("c", 12, SessionKind::Work, 25),
        ];

        let lr = Reconciler::merge(&left, &right);
        let rl = Reconciler::merge(&right, &left);

        assert_eq!(lr.merged, rl.merged);
    }

    #[test]
    fn test_merge_sorted_newest_first() {
        let local = vec![
            make_record("a", 10, SessionKind::Work, 25),
            make_record("c", 12, SessionKind::Work, 25),
        ];
        let remote = vec![make_record("b", 11, SessionKind::Work, 25)];

        let plan = Reconciler::merge(&local, &remote);
        let order: Vec<&str> = plan.merged.iter().map(|s| s.id.as_str()).collect();

        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_merge_local_wins_on_divergent_content() {
        let local = vec![make_record("x", 10, SessionKind::Work, 25)];
        let remote = vec![make_record("x", 10, SessionKind::Work, 50)];

        let plan = Reconciler::merge(&local, &remote);

        assert_eq!(plan.merged.len(), 1);
        assert_eq!(plan.merged[0].duration_minutes, 25);
        assert_eq!(plan.divergent, vec!["x".to_string()]);
        assert!(plan.to_push.is_empty());
    }

    #[test]
    fn test_merge_owner_tag_is_not_divergence() {
        let local = vec![make_record("x", 10, SessionKind::Work, 25)];
        let remote = vec![local[0].owned_by("u1")];

        let plan = Reconciler::merge(&local, &remote);

        assert!(plan.divergent.is_empty());
        assert!(plan.to_push.is_empty());
        assert_eq!(plan.pulled, 0);
    }

    #[test]
    fn test_merge_collapses_local_duplicates() {
        let record = make_record("dup", 10, SessionKind::Work, 25);
        let local = vec![record.clone(), record];

        let plan = Reconciler::merge(&local, &[]);

        assert_eq!(plan.merged.len(), 1);
        assert_eq!(plan.to_push.len(), 1);
    }

    #[test]
    fn test_merge_empty_sides() {
        let plan = Reconciler::merge(&[], &[]);
        assert!(plan.merged.is_empty());
        assert!(plan.to_push.is_empty());
        assert_eq!(plan.pulled, 0);
    }

    // ========== reconcile() tests ==========

    #[tokio::test]
    async fn test_reconcile_pulls_and_pushes() {
        let (store, _temp) = create_test_store();
        let user = UserContext::new("u1");
        let a = make_record("1", 10, SessionKind::Work, 25);
        let b = make_record("2", 11, SessionKind::ShortBreak, 5);
        let c = make_record("3", 12, SessionKind::Work, 25);
        let repo = Arc::new(MemoryRepository::with_sessions(
            "u1",
            vec![b.owned_by("u1"), c.owned_by("u1")],
        ));
        let reconciler = Reconciler::new(repo.clone());

        let report = reconciler
            .reconcile(&store, vec![a.clone(), b.clone()], Some(&user))
            .await;

        assert_eq!(report.status, SyncStatus::Synced);
        assert_eq!(report.sessions.len(), 3);
        assert_eq!(report.pushed, 1);
        assert_eq!(report.pulled, 1);
        assert_eq!(repo.write_count(), 1);
        assert!(report.persisted);
        assert_eq!(ids(&store.load()), ids(&[a.clone(), b, c]));

        let pushed = repo
            .sessions_for("u1")
            .into_iter()
            .find(|s| s.id == a.id)
            .unwrap();
        assert_eq!(pushed.owner_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_reconcile_twice_is_idempotent() {
        let (store, _temp) = create_test_store();
        let user = UserContext::new("u1");
        let repo = Arc::new(MemoryRepository::with_sessions(
            "u1",
            vec![make_record("r", 9, SessionKind::Work, 25)],
        ));
        let reconciler = Reconciler::new(repo.clone());
        let local = vec![make_record("l", 10, SessionKind::Work, 25)];

        let first = reconciler.reconcile(&store, local, Some(&user)).await;
        let writes_after_first = repo.write_count();
        let second = reconciler
            .reconcile(&store, first.sessions.clone(), Some(&user))
            .await;

        assert_eq!(first.sessions, second.sessions);
        assert_eq!(second.pushed, 0);
        assert_eq!(second.pulled, 0);
        assert_eq!(repo.write_count(), writes_after_first);
    }

    #[tokio::test]
    async fn test_reconcile_offline_returns_local_unchanged() {
        let (store, _temp) = create_test_store();
        let repo = Arc::new(MemoryRepository::new());
        repo.set_offline(true);
        let reconciler = Reconciler::new(repo);
        let local = vec![make_record("a", 10, SessionKind::Work, 25)];

        let report = reconciler
            .reconcile(&store, local.clone(), Some(&UserContext::new("u1")))
            .await;

        assert!(matches!(report.status, SyncStatus::Skipped(_)));
        assert_eq!(report.sessions, local);
        assert_eq!(report.pushed, 0);
    }

    #[tokio::test]
    async fn test_reconcile_without_user_is_local_only() {
        let (store, _temp) = create_test_store();
        let repo = Arc::new(MemoryRepository::new());
        let reconciler = Reconciler::new(repo.clone());
        let local = vec![make_record("a", 10, SessionKind::Work, 25)];

        let report = reconciler.reconcile(&store, local.clone(), None).await;

        assert_eq!(report.status, SyncStatus::LocalOnly);
        assert_eq!(report.sessions, local);
        assert!(report.persisted);
        assert_eq!(store.load(), local);
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_fetch_timeout_is_skipped() {
        let (store, _temp) = create_test_store();
        let reconciler = Reconciler::new(Arc::new(HangingRepository))
            .with_timeout(Duration::from_millis(20));
        let local = vec![make_record("a", 10, SessionKind::Work, 25)];

        let report = reconciler
            .reconcile(&store, local.clone(), Some(&UserContext::new("u1")))
            .await;

        assert!(matches!(report.status, SyncStatus::Skipped(_)));
        assert_eq!(report.sessions, local);
    }

    #[tokio::test]
    async fn test_push_failures_do_not_abort_merge() {
        let (store, _temp) = create_test_store();
        let repo = Arc::new(FlakyRepository {
            inner: MemoryRepository::new(),
            reject: HashSet::from(["bad".to_string()]),
            put_attempts: Mutex::new(Vec::new()),
        });
        let reconciler = Reconciler::new(repo.clone());
        let local = vec![
            make_record("good", 10, SessionKind::Work, 25),
            make_record("bad", 11, SessionKind::Work, 25),
        ];
        let user = UserContext::new("u1");

        let report = reconciler.reconcile(&store, local, Some(&user)).await;

        assert_eq!(report.status, SyncStatus::Synced);
        assert_eq!(report.pushed, 1);
        assert_eq!(report.push_failures.len(), 1);
        assert_eq!(report.push_failures[0].session_id, "bad");
        assert_eq!(report.sessions.len(), 2);
        assert_eq!(store.load().len(), 2);

        // the failed record is retried on the next pass
        let retry = reconciler
            .reconcile(&store, report.sessions, Some(&user))
            .await;
        assert_eq!(retry.push_failures.len(), 1);
        let attempts = repo.put_attempts.lock().unwrap().clone();
        assert_eq!(attempts.iter().filter(|id| *id == "bad").count(), 2);
        assert_eq!(attempts.iter().filter(|id| *id == "good").count(), 1);
    }

    // ========== delete() tests ==========

    #[tokio::test]
    async fn test_delete_removes_locally_and_remotely() {
        let (store, _temp) = create_test_store();
        let user = UserContext::new("u1");
        let a = make_record("a", 10, SessionKind::Work, 25);
        let b = make_record("b", 11, SessionKind::Work, 25);
        let repo = Arc::new(MemoryRepository::with_sessions(
            "u1",
            vec![a.owned_by("u1"), b.owned_by("u1")],
        ));
        let reconciler = Reconciler::new(repo.clone());

        let outcome = reconciler
            .delete(
                &store,
                vec![a, b.clone()],
                &HashSet::from(["a".to_string()]),
                Some(&user),
            )
            .await
            .unwrap();

        assert_eq!(outcome.removed, vec!["a".to_string()]);
        assert_eq!(outcome.sessions, vec![b.clone()]);
        assert_eq!(store.load(), vec![b]);

        let failed = outcome.remote.unwrap().await.unwrap();
        assert_eq!(failed, 0);
        let remaining = repo.sessions_for("u1");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "b");
    }

    #[tokio::test]
    async fn test_failed_remote_delete_reappears_on_pull() {
        let (store, _temp) = create_test_store();
        let user = UserContext::new("u1");
        let a = make_record("a", 10, SessionKind::Work, 25);
        let repo = Arc::new(MemoryRepository::with_sessions("u1", vec![a.owned_by("u1")]));
        let reconciler = Reconciler::new(repo.clone());

        repo.set_offline(true);
        let outcome = reconciler
            .delete(
                &store,
                vec![a],
                &HashSet::from(["a".to_string()]),
                Some(&user),
            )
            .await
            .unwrap();
        assert_eq!(outcome.remote.unwrap().await.unwrap(), 1);
        assert!(store.load().is_empty());

        repo.set_offline(false);
        let report = reconciler
            .reconcile(&store, outcome.sessions, Some(&user))
            .await;
        assert_eq!(report.pulled, 1);
        assert_eq!(report.sessions[0].id, "a");
    }

    #[tokio::test]
    async fn test_delete_without_user_skips_remote() {
        let (store, _temp) = create_test_store();
        let reconciler = Reconciler::new(Arc::new(MemoryRepository::new()));

        let outcome = reconciler
            .delete(
                &store,
                vec![make_record("a", 10, SessionKind::Work, 25)],
                &HashSet::from(["a".to_string()]),
                None,
            )
            .await
            .unwrap();

        assert!(outcome.remote.is_none());
        assert!(outcome.sessions.is_empty());
    }

    #[test]
    fn test_remove_selected_ignores_unknown_ids() {
        let sessions = vec![make_record("a", 10, SessionKind::Work, 25)];
        let (kept, removed) = remove_selected(sessions, &HashSet::from(["zzz".to_string()]));
        assert_eq!(kept.len(), 1);
        assert!(removed.is_empty());
    }
}
