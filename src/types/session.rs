//! Session types for the pomodoro log

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{PomosyncError, Result};

/// Kind of timer interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SessionKind {
    #[serde(rename = "Work")]
    Work,
    #[serde(rename = "Short Break")]
    ShortBreak,
    #[serde(rename = "Long Break")]
    LongBreak,
}

impl SessionKind {
    pub const ALL: [SessionKind; 3] = [Self::Work, Self::ShortBreak, Self::LongBreak];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SessionKind {
    type Err = PomosyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace(['-', '_'], " ").as_str() {
            "work" => Ok(Self::Work),
            "short break" | "short" => Ok(Self::ShortBreak),
            "long break" | "long" => Ok(Self::LongBreak),
            other => Err(PomosyncError::InvalidSession(format!(
                "unknown session kind: {}",
                other
            ))),
        }
    }
}

/// One completed timer interval.
///
/// The `id` is the identity across local and remote stores: two records with
/// the same id are the same logical session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: String,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    #[serde(
        rename = "userId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub owner_id: Option<String>,
}

impl SessionRecord {
    /// Create a record with a fresh UUID. Zero-length sessions are rejected.
    pub fn new(
        kind: SessionKind,
        duration_minutes: u32,
        timestamp: DateTime<Utc>,
        owner_id: Option<String>,
    ) -> Result<Self> {
        if duration_minutes == 0 {
            return Err(PomosyncError::InvalidSession(
                "duration must be at least one minute".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            duration_minutes,
            kind,
            owner_id,
        })
    }

    /// Same logical content, ignoring the owner tag added on push
    pub fn same_content(&self, other: &SessionRecord) -> bool {
        self.id == other.id
            && self.timestamp == other.timestamp
            && self.duration_minutes == other.duration_minutes
            && self.kind == other.kind
    }

    /// Copy of this record tagged with the owning user
    pub fn owned_by(&self, user_id: &str) -> SessionRecord {
        SessionRecord {
            owner_id: Some(user_id.to_string()),
            ..self.clone()
        }
    }

    /// Convert UTC timestamp to local timezone date.
    pub fn local_date(&self) -> NaiveDate {
        self.timestamp.with_timezone(&Local).date_naive()
    }
}

/// Timer completion event, the sole trigger into the sync core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSession {
    pub kind: SessionKind,
    pub duration_minutes: u32,
    pub started_at: DateTime<Utc>,
}

/// Derived statistics over a session collection. Never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Aggregate {
    pub session_count: u64,
    pub total_minutes: u64,
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
}

impl Aggregate {
    pub fn empty() -> Self {
        Self {
            session_count: 0,
            total_minutes: 0,
            window_start: None,
            window_end: None,
        }
    }
}

/// Sessions completed on a single calendar day
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub session_count: u64,
    pub total_minutes: u64,
}
