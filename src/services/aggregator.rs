//! Aggregator service for computing session statistics

use crate::types::{Aggregate, DailyTotal, ReportFrequency, SessionKind, SessionRecord};
use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc,
};
use std::collections::HashMap;

/// Aggregator for computing session statistics
pub struct Aggregator;

impl Aggregator {
    pub fn filter_by_kind(sessions: &[SessionRecord], kind: SessionKind) -> Vec<SessionRecord> {
        sessions.iter().filter(|s| s.kind == kind).cloned().collect()
    }

    /// Sessions starting at or after `since` (inclusive lower bound)
    pub fn filter_since(sessions: &[SessionRecord], since: DateTime<Utc>) -> Vec<SessionRecord> {
        sessions
            .iter()
            .filter(|s| s.timestamp >= since)
            .cloned()
            .collect()
    }

    /// Count and total minutes, with no window attached
    pub fn summarize(sessions: &[SessionRecord]) -> Aggregate {
        let mut aggregate = Aggregate::empty();
        for session in sessions {
            aggregate.session_count = aggregate.session_count.saturating_add(1);
            aggregate.total_minutes = aggregate
                .total_minutes
                .saturating_add(u64::from(session.duration_minutes));
        }
        aggregate
    }

    /// Start of the report period containing `now`, in `now`'s timezone.
    pub fn window_start<Tz: TimeZone>(
        frequency: ReportFrequency,
        now: &DateTime<Tz>,
    ) -> DateTime<Utc> {
        let today = now.date_naive();
        let first_day = match frequency {
            ReportFrequency::Daily => today,
            ReportFrequency::Weekly => {
                today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
            }
            ReportFrequency::Monthly => today.with_day(1).unwrap_or(today),
        };
        start_of_day(&now.timezone(), first_day)
    }

    /// Sessions inside the current period window (`window_start..=now`)
    pub fn in_window<Tz: TimeZone>(
        frequency: ReportFrequency,
        sessions: &[SessionRecord],
        now: &DateTime<Tz>,
    ) -> Vec<SessionRecord> {
        let start = Self::window_start(frequency, now);
        let end = now.with_timezone(&Utc);
        sessions
            .iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= end)
            .cloned()
            .collect()
    }

    /// Summary of the current period window
    pub fn window<Tz: TimeZone>(
        frequency: ReportFrequency,
        sessions: &[SessionRecord],
        now: &DateTime<Tz>,
    ) -> Aggregate {
        let mut aggregate = Self::summarize(&Self::in_window(frequency, sessions, now));
        aggregate.window_start = Some(Self::window_start(frequency, now));
        aggregate.window_end = Some(now.with_timezone(&Utc));
        aggregate
    }

    /// Totals per session kind, in `SessionKind::ALL` order
    pub fn by_kind(sessions: &[SessionRecord]) -> Vec<(SessionKind, Aggregate)> {
        SessionKind::ALL
            .iter()
            .map(|&kind| (kind, Self::summarize(&Self::filter_by_kind(sessions, kind))))
            .collect()
    }

    /// Aggregate sessions by calendar day in `tz` (sorted by date ascending)
    pub fn daily<Tz: TimeZone>(sessions: &[SessionRecord], tz: &Tz) -> Vec<DailyTotal> {
        let mut daily_map: HashMap<NaiveDate, DailyTotal> = HashMap::new();

        for session in sessions {
            let date = session.timestamp.with_timezone(tz).date_naive();
            let total = daily_map.entry(date).or_insert_with(|| DailyTotal {
                date,
                session_count: 0,
                total_minutes: 0,
            });
            total.session_count = total.session_count.saturating_add(1);
            total.total_minutes = total
                .total_minutes
                .saturating_add(u64::from(session.duration_minutes));
        }

        let mut result: Vec<DailyTotal> = daily_map.into_values().collect();
        result.sort_by_key(|d| d.date);
        result
    }

    /// Up to `limit` work sessions, newest first (ties broken by id)
    pub fn recent_work(sessions: &[SessionRecord], limit: usize) -> Vec<SessionRecord> {
        let mut work = Self::filter_by_kind(sessions, SessionKind::Work);
        work.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        work.truncate(limit);
        work
    }
}

/// First instant of `date` in `tz`.
///
/// Midnight that falls into a DST gap resolves to 01:00.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            let fallback = midnight + Duration::hours(1);
            tz.from_local_datetime(&fallback)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
        }
    }
}

/// Format minutes as hours and minutes, e.g. `100` → `"1h 40m"`
pub fn format_minutes(total_minutes: u64) -> String {
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}
