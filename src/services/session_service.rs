//! Session service: the in-memory source of truth
//!
//! Owns the session collection for one running instance and serializes
//! append, delete and merge through a single async mutex. Remote sync and
//! reporting are optional and driven by explicit user context values.

use std::collections::HashSet;
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::reconciler::{remove_selected, sort_sessions, DeleteOutcome, Reconciler, SyncReport};
use super::remote::bounded;
use super::scheduler::{DispatchOutcome, ReportDispatcher};
use super::SessionStore;
use crate::types::{
    CompletedSession, PomosyncError, Result, SessionRecord, UserContext, UserPreferences,
};

/// What happened after a session completed
#[derive(Debug)]
pub struct CompletionOutcome {
    pub record: SessionRecord,
    /// `None` when no push was attempted (local-only)
    pub push: Option<Result<()>>,
    /// `None` when reporting is not configured or no preferences were given
    pub report: Option<DispatchOutcome>,
}

pub struct SessionService<Tz: TimeZone = Local> {
    store: SessionStore,
    reconciler: Option<Reconciler>,
    dispatcher: Option<ReportDispatcher<Tz>>,
    sessions: Mutex<Vec<SessionRecord>>,
}

impl<Tz: TimeZone> SessionService<Tz>
where
    Tz::Offset: Display,
{
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            reconciler: None,
            dispatcher: None,
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: ReportDispatcher<Tz>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Snapshot of the in-memory collection
    pub async fn sessions(&self) -> Vec<SessionRecord> {
        self.sessions.lock().await.clone()
    }

    /// Load the local store, then pull-and-merge with the remote
    pub async fn start(&self, user: Option<&UserContext>) -> SyncReport {
        let mut sessions = self.sessions.lock().await;
        *sessions = self.store.load();
        debug!(count = sessions.len(), "loaded local sessions");
        self.sync_locked(&mut sessions, user).await
    }

    /// Merge the in-memory collection with the remote
    pub async fn sync(&self, user: Option<&UserContext>) -> SyncReport {
        let mut sessions = self.sessions.lock().await;
        self.sync_locked(&mut sessions, user).await
    }

    async fn sync_locked(
        &self,
        sessions: &mut Vec<SessionRecord>,
        user: Option<&UserContext>,
    ) -> SyncReport {
        let local = std::mem::take(sessions);
        let report = match &self.reconciler {
            Some(reconciler) => reconciler.reconcile(&self.store, local, user).await,
            None => SyncReport::local_only(&self.store, local),
        };
        *sessions = report.sessions.clone();
        report
    }

    /// Record a completed timer interval.
    ///
    /// The session is saved locally before any push; a failed save is
    /// returned as an error and no push is attempted. Push and report
    /// failures are reported in the outcome, not raised.
    pub async fn complete_session(
        &self,
        event: CompletedSession,
        user: Option<&UserContext>,
        preferences: Option<&mut UserPreferences>,
        now: &DateTime<Tz>,
    ) -> Result<CompletionOutcome> {
        let record = SessionRecord::new(
            event.kind,
            event.duration_minutes,
            event.started_at,
            user.map(|u| u.user_id.clone()),
        )?;

        let snapshot = {
            let mut sessions = self.sessions.lock().await;
            let mut updated = sessions.clone();
            updated.push(record.clone());
            sort_sessions(&mut updated);
            // In-memory state only advances once the store accepted it
            self.store.save(&updated)?;
            *sessions = updated.clone();
            updated
        };
        info!(session_id = %record.id, kind = %record.kind, minutes = record.duration_minutes, "session recorded");

        let push = match (&self.reconciler, user) {
            (Some(reconciler), Some(user)) => {
                let (_, mut failures) = reconciler
                    .push_all(user, std::slice::from_ref(&record))
                    .await;
                Some(match failures.pop() {
                    Some(failure) => Err(failure.error),
                    None => Ok(()),
                })
            }
            _ => None,
        };

        let report = match (&self.dispatcher, preferences) {
            (Some(dispatcher), Some(preferences)) => {
                Some(dispatcher.dispatch_if_due(preferences, &snapshot, now).await)
            }
            _ => None,
        };

        Ok(CompletionOutcome {
            record,
            push,
            report,
        })
    }

    /// Delete the selected sessions locally, then remotely in the background
    pub async fn delete_sessions(
        &self,
        ids: &[String],
        user: Option<&UserContext>,
    ) -> Result<DeleteOutcome> {
        let selection: HashSet<String> = ids.iter().cloned().collect();
        let mut sessions = self.sessions.lock().await;
        let current = sessions.clone();

        let outcome = match &self.reconciler {
            Some(reconciler) => reconciler.delete(&self.store, current, &selection, user).await?,
            None => {
                let (kept, removed) = remove_selected(current, &selection);
                self.store.save(&kept)?;
                DeleteOutcome {
                    sessions: kept,
                    removed,
                    remote: None,
                }
            }
        };

        info!(removed = outcome.removed.len(), "sessions deleted");
        *sessions = outcome.sessions.clone();
        Ok(outcome)
    }

    /// Fetch the user's preferences document; `None` when unavailable
    pub async fn load_preferences(&self, user: &UserContext) -> Option<UserPreferences> {
        let reconciler = self.reconciler.as_ref()?;
        match bounded(
            reconciler.timeout(),
            "fetch preferences",
            reconciler.repository().fetch_preferences(&user.user_id),
        )
        .await
        {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(user_id = %user.user_id, error = %e, "could not load preferences");
                None
            }
        }
    }

    /// Save preferences remotely. `false` tells the caller to offer a retry.
    pub async fn save_preferences(&self, preferences: &UserPreferences) -> bool {
        let Some(reconciler) = &self.reconciler else {
            warn!("no remote configured, preferences not saved");
            return false;
        };
        match bounded(
            reconciler.timeout(),
            "save preferences",
            reconciler.repository().put_preferences(preferences),
        )
        .await
        {
            Ok(()) => true,
            Err(e) => {
                let e = match e {
                    PomosyncError::PreferenceUpdate(_) => e,
                    other => PomosyncError::PreferenceUpdate(other.to_string()),
                };
                warn!(user_id = %preferences.user_id, error = %e, "preferences not saved");
                false
            }
        }
    }
}
