//! Per-user notification preferences

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{PomosyncError, Result};

/// How often a summary report is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReportFrequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl ReportFrequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Human period label used in report headings
    pub fn period_label(&self) -> &'static str {
        match self {
            Self::Daily => "Today",
            Self::Weekly => "This Week",
            Self::Monthly => "This Month",
        }
    }
}

impl fmt::Display for ReportFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportFrequency {
    type Err = PomosyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            other => Err(PomosyncError::Config(format!(
                "unknown report frequency: {}",
                other
            ))),
        }
    }
}

/// Preferences document stored at `/users/{userId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,
    #[serde(rename = "emailNotificationsEnabled", default)]
    pub notifications_enabled: bool,
    #[serde(rename = "emailFrequency", default)]
    pub report_frequency: ReportFrequency,
    #[serde(
        rename = "lastEmailSent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_report_sent_at: Option<DateTime<Utc>>,
}

impl UserPreferences {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            display_name: None,
            notifications_enabled: false,
            report_frequency: ReportFrequency::default(),
            last_report_sent_at: None,
        }
    }
}

/// Explicit identity of the signed-in user, passed into sync and scheduling
/// calls. `None` at call sites means local-only mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserContext {
    pub user_id: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
