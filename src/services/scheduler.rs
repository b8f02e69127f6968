//! Report scheduling
//!
//! A report is due when notifications are enabled and the current instant
//! falls into a different period bucket (calendar day, ISO week or calendar
//! month) than the last report sent.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::aggregator::Aggregator;
use super::remote::{bounded, SessionRepository, DEFAULT_REMOTE_TIMEOUT};
use super::report::ReportRenderer;
use super::sender::ReportSender;
use crate::types::{ReportFrequency, Result, SessionRecord, UserPreferences};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDecision {
    NotDue,
    Due {
        frequency: ReportFrequency,
        window_start: DateTime<Utc>,
    },
}

/// When `last_report_sent_at` is advanced relative to delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkSentPolicy {
    /// Mark only after the sender confirmed delivery
    #[default]
    AfterConfirmedSend,
    /// Mark whenever a report was due, even if sending failed
    Optimistic,
}

pub struct ReportScheduler;

impl ReportScheduler {
    /// Decide whether a report is due at `now` (bucketed in `now`'s timezone)
    pub fn evaluate<Tz: TimeZone>(
        preferences: Option<&UserPreferences>,
        now: &DateTime<Tz>,
    ) -> ReportDecision {
        let Some(prefs) = preferences else {
            return ReportDecision::NotDue;
        };
        if !prefs.notifications_enabled {
            return ReportDecision::NotDue;
        }

        let frequency = prefs.report_frequency;
        let due = match prefs.last_report_sent_at {
            None => true,
            Some(last) => {
                let last = last.with_timezone(&now.timezone());
                !Self::same_period(frequency, &last, now)
            }
        };

        if due {
            ReportDecision::Due {
                frequency,
                window_start: Aggregator::window_start(frequency, now),
            }
        } else {
            ReportDecision::NotDue
        }
    }

    /// Whether `a` and `b` fall into the same report bucket
    pub fn same_period<Tz: TimeZone>(
        frequency: ReportFrequency,
        a: &DateTime<Tz>,
        b: &DateTime<Tz>,
    ) -> bool {
        let (a, b) = (a.date_naive(), b.date_naive());
        match frequency {
            ReportFrequency::Daily => a == b,
            ReportFrequency::Weekly => a.iso_week() == b.iso_week(),
            ReportFrequency::Monthly => a.year() == b.year() && a.month() == b.month(),
        }
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    NotDue,
    Dispatched {
        /// Sender result
        delivered: Result<()>,
        /// `last_report_sent_at` was advanced
        marked_sent: bool,
        /// The advanced preferences reached the remote document
        persisted: bool,
    },
}

impl DispatchOutcome {
    pub fn was_delivered(&self) -> bool {
        matches!(self, Self::Dispatched { delivered: Ok(()), .. })
    }
}

/// Drives a due report through aggregate → render → send → mark-sent
pub struct ReportDispatcher<Tz: TimeZone> {
    renderer: ReportRenderer<Tz>,
    sender: Arc<dyn ReportSender>,
    repository: Option<Arc<dyn SessionRepository>>,
    policy: MarkSentPolicy,
    recent_limit: usize,
    timeout: Duration,
}

impl<Tz: TimeZone> ReportDispatcher<Tz>
where
    Tz::Offset: Display,
{
    pub fn new(renderer: ReportRenderer<Tz>, sender: Arc<dyn ReportSender>) -> Self {
        Self {
            renderer,
            sender,
            repository: None,
            policy: MarkSentPolicy::default(),
            recent_limit: super::report::DEFAULT_RECENT_LIMIT,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Persist advanced preferences through `repository`
    pub fn with_repository(mut self, repository: Arc<dyn SessionRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_policy(mut self, policy: MarkSentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self.renderer = self.renderer.with_recent_limit(limit);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render the report for the period containing `now` without sending
    pub fn preview(
        &self,
        frequency: ReportFrequency,
        sessions: &[SessionRecord],
        now: &DateTime<Tz>,
    ) -> (String, String) {
        let in_window = Aggregator::in_window(frequency, sessions, now);
        let aggregate = Aggregator::window(frequency, sessions, now);
        let recent = Aggregator::recent_work(&in_window, self.recent_limit);
        let label = frequency.period_label();
        (
            ReportRenderer::<Tz>::subject(label),
            self.renderer.render(&aggregate, &recent, label),
        )
    }

    /// Send the report if due, then advance `preferences.last_report_sent_at`
    /// according to the mark-sent policy.
    pub async fn dispatch_if_due(
        &self,
        preferences: &mut UserPreferences,
        sessions: &[SessionRecord],
        now: &DateTime<Tz>,
    ) -> DispatchOutcome {
        let frequency = match ReportScheduler::evaluate(Some(&*preferences), now) {
            ReportDecision::NotDue => {
                debug!(user_id = %preferences.user_id, "report not due");
                return DispatchOutcome::NotDue;
            }
            ReportDecision::Due { frequency, .. } => frequency,
        };

        let (subject, content) = self.preview(frequency, sessions, now);
        let delivered = bounded(
            self.timeout,
            "send report",
            self.sender.send(&preferences.email, &subject, &content),
        )
        .await;

        match &delivered {
            Ok(()) => info!(user_id = %preferences.user_id, %frequency, "report sent"),
            Err(e) => warn!(user_id = %preferences.user_id, error = %e, "report send failed"),
        }

        let marked_sent = delivered.is_ok() || self.policy == MarkSentPolicy::Optimistic;
        let persisted = if marked_sent {
            preferences.last_report_sent_at = Some(now.with_timezone(&Utc));
            self.persist(preferences).await
        } else {
            false
        };

        DispatchOutcome::Dispatched {
            delivered,
            marked_sent,
            persisted,
        }
    }

    async fn persist(&self, preferences: &UserPreferences) -> bool {
        let Some(repository) = &self.repository else {
            return false;
        };
        match bounded(
            self.timeout,
            "save preferences",
            repository.put_preferences(preferences),
        )
        .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %preferences.user_id, error = %e, "failed to record report send time");
                false
            }
        }
    }
}
