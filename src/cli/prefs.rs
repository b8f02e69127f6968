//! `pomosync prefs` subcommand for editing report preferences

use clap::Args;

use crate::types::{PomosyncError, ReportFrequency, Result, UserPreferences};

/// Edit email report preferences
#[derive(Args, Debug, Default)]
pub struct PrefsArgs {
    /// User whose preferences are edited (defaults to config `user.id`)
    #[arg(long)]
    pub user: Option<String>,

    /// Report recipient address
    #[arg(long)]
    pub email: Option<String>,

    /// Display name shown in reports
    #[arg(long)]
    pub name: Option<String>,

    /// Enable email reports
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable email reports
    #[arg(long)]
    pub disable: bool,

    /// Report frequency: daily, weekly or monthly
    #[arg(long)]
    pub frequency: Option<ReportFrequency>,
}

impl PrefsArgs {
    /// Start from `existing` (or a fresh document) and apply the flags.
    /// Returns the preferences and whether anything changed.
    pub fn apply(
        &self,
        user_id: &str,
        existing: Option<UserPreferences>,
    ) -> Result<(UserPreferences, bool)> {
        let mut changed = existing.is_none();
        let mut prefs = match existing {
            Some(prefs) => prefs,
            None => {
                let email = self.email.clone().ok_or_else(|| {
                    PomosyncError::Config(
                        "No preferences stored yet. Provide --email to create them".into(),
                    )
                })?;
                UserPreferences::new(user_id, email)
            }
        };

        if let Some(email) = &self.email {
            if prefs.email != *email {
                prefs.email = email.clone();
                changed = true;
            }
        }

        if let Some(name) = &self.name {
            prefs.display_name = Some(name.clone());
            changed = true;
        }

        if self.enable && !prefs.notifications_enabled {
            prefs.notifications_enabled = true;
            changed = true;
        }

        if self.disable && prefs.notifications_enabled {
            prefs.notifications_enabled = false;
            changed = true;
        }

        if let Some(frequency) = self.frequency {
            if prefs.report_frequency != frequency {
                prefs.report_frequency = frequency;
                changed = true;
            }
        }

        Ok((prefs, changed))
    }
}
