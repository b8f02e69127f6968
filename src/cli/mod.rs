mod prefs;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{Duration, Local, Utc};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::services::{
    format_minutes, Aggregator, DispatchOutcome, HttpRepository, OutboxSender, Reconciler,
    ReportDispatcher, ReportFormat, ReportRenderer, SessionRepository, SessionService,
    SessionStore, SyncStatus,
};
use crate::types::{
    CompletedSession, PomosyncError, ReportFrequency, SessionKind, SessionRecord, UserContext,
};

pub use prefs::PrefsArgs;

/// Pomodoro session log with cloud sync and email summaries
#[derive(Parser)]
#[command(name = "pomosync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default ~/.pomosync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a completed session
    Record {
        /// work, short-break or long-break
        #[arg(long, default_value = "work")]
        kind: SessionKind,

        /// Session length in minutes
        #[arg(long, default_value_t = 25)]
        minutes: u32,

        #[arg(long)]
        user: Option<String>,
    },

    /// List recorded sessions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge local sessions with the remote collection
    Sync {
        #[arg(long)]
        user: Option<String>,
    },

    /// Delete sessions by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long)]
        user: Option<String>,
    },

    /// Show statistics for the current period (default)
    Stats {
        /// daily, weekly or monthly
        #[arg(long, default_value = "weekly")]
        period: ReportFrequency,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview the summary report for the current period
    Report {
        #[arg(long, default_value = "weekly")]
        period: ReportFrequency,

        /// Plain text instead of HTML
        #[arg(long)]
        text: bool,
    },

    /// Edit email report preferences
    Prefs(PrefsArgs),
}

impl Cli {
    pub fn init_logging(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load().unwrap_or_else(|e| {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Config::default()
            }),
        };
        let service = build_service(&config)?;

        match self.command {
            Some(Commands::Record {
                kind,
                minutes,
                user,
            }) => {
                let user = resolve_user(user, &config);
                service.start(user.as_ref()).await;

                let mut preferences = match &user {
                    Some(user) => service.load_preferences(user).await,
                    None => None,
                };
                let event = CompletedSession {
                    kind,
                    duration_minutes: minutes,
                    started_at: Utc::now() - Duration::minutes(i64::from(minutes)),
                };
                let outcome = service
                    .complete_session(event, user.as_ref(), preferences.as_mut(), &Local::now())
                    .await?;

                println!(
                    "Recorded {} ({} min) {}",
                    outcome.record.kind, outcome.record.duration_minutes, outcome.record.id
                );
                if let Some(Err(e)) = &outcome.push {
                    println!("Not synced yet ({}); {}", e, retry_hint(e));
                }
                if let Some(DispatchOutcome::Dispatched { delivered, .. }) = &outcome.report {
                    match delivered {
                        Ok(()) => println!("Summary report sent"),
                        Err(e) => println!("Summary report failed: {}", e),
                    }
                }
                Ok(())
            }
            Some(Commands::List { json }) => {
                service.start(None).await;
                let sessions = service.sessions().await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&sessions)?);
                } else {
                    print_sessions(&sessions);
                }
                Ok(())
            }
            Some(Commands::Sync { user }) => {
                let user = resolve_user(user, &config);
                let report = service.start(user.as_ref()).await;
                match &report.status {
                    SyncStatus::Synced => {
                        println!(
                            "Synced {} sessions (pulled {}, pushed {}, {} pending)",
                            report.sessions.len(),
                            report.pulled,
                            report.pushed,
                            report.push_failures.len()
                        );
                        for failure in &report.push_failures {
                            println!(
                                "  {}: {}; {}",
                                failure.session_id,
                                failure.error,
                                retry_hint(&failure.error)
                            );
                        }
                    }
                    SyncStatus::Skipped(reason) => {
                        println!("Sync skipped: {}. Local data is unaffected.", reason)
                    }
                    SyncStatus::LocalOnly => {
                        println!("No user or remote configured; running local-only")
                    }
                }
                Ok(())
            }
            Some(Commands::Delete { ids, user }) => {
                let user = resolve_user(user, &config);
                service.start(user.as_ref()).await;
                let outcome = service.delete_sessions(&ids, user.as_ref()).await?;
                println!("Deleted {} session(s)", outcome.removed.len());
                if let Some(remote) = outcome.remote {
                    let failed = remote.await.context("remote delete task failed")?;
                    if failed > 0 {
                        println!(
                            "{} remote delete(s) failed; they may reappear after the next sync",
                            failed
                        );
                    }
                }
                Ok(())
            }
            Some(Commands::Stats { period, json }) => {
                service.start(None).await;
                print_stats(&service.sessions().await, period, json)
            }
            None => {
                service.start(None).await;
                print_stats(&service.sessions().await, ReportFrequency::Weekly, false)
            }
            Some(Commands::Report { period, text }) => {
                service.start(None).await;
                let sessions = service.sessions().await;
                let now = Local::now();
                let in_window = Aggregator::in_window(period, &sessions, &now);
                let aggregate = Aggregator::window(period, &sessions, &now);
                let recent = Aggregator::recent_work(&in_window, config.report.recent_limit);
                let format = if text {
                    ReportFormat::Text
                } else {
                    ReportFormat::Html
                };
                let renderer =
                    ReportRenderer::local().with_recent_limit(config.report.recent_limit);
                print!(
                    "{}",
                    renderer.render_as(format, &aggregate, &recent, period.period_label())
                );
                Ok(())
            }
            Some(Commands::Prefs(args)) => {
                let Some(user) = resolve_user(args.user.clone(), &config) else {
                    bail!("No user given. Pass --user or set user.id in the config");
                };
                if config.remote.base_url.is_none() {
                    bail!("No remote configured. Set remote.base_url to store preferences");
                }

                let existing = service.load_preferences(&user).await;
                let (preferences, changed) = args.apply(&user.user_id, existing)?;
                if changed && !service.save_preferences(&preferences).await {
                    bail!("Could not save preferences. Please try again.");
                }
                println!("{}", serde_json::to_string_pretty(&preferences)?);
                Ok(())
            }
        }
    }
}

fn retry_hint(error: &PomosyncError) -> &'static str {
    if error.is_transient() {
        "will retry on next sync"
    } else {
        "check the remote configuration"
    }
}

fn resolve_user(flag: Option<String>, config: &Config) -> Option<UserContext> {
    flag.or_else(|| config.user.id.clone()).map(UserContext::new)
}

fn build_service(config: &Config) -> anyhow::Result<SessionService> {
    let store = SessionStore::with_data_dir(config.data_dir()?);
    let mut service = SessionService::new(store);

    if let Some(base_url) = &config.remote.base_url {
        let timeout = config.remote_timeout();
        let repository: Arc<dyn SessionRepository> =
            Arc::new(HttpRepository::with_timeout(base_url, timeout)?);
        let sender = Arc::new(OutboxSender::new(config.outbox_dir()?));
        let dispatcher = ReportDispatcher::new(ReportRenderer::local(), sender)
            .with_repository(Arc::clone(&repository))
            .with_policy(config.report.mark_sent)
            .with_recent_limit(config.report.recent_limit)
            .with_timeout(timeout);

        service = service
            .with_reconciler(Reconciler::new(repository).with_timeout(timeout))
            .with_dispatcher(dispatcher);
    }

    Ok(service)
}

fn print_sessions(sessions: &[SessionRecord]) {
    if sessions.is_empty() {
        println!("No sessions recorded yet");
        return;
    }
    for session in sessions {
        println!(
            "{}  {:<11}  {:>4} min  {}",
            session.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            session.kind.label(),
            session.duration_minutes,
            session.id
        );
    }
}

fn print_stats(
    sessions: &[SessionRecord],
    period: ReportFrequency,
    as_json: bool,
) -> anyhow::Result<()> {
    let now = Local::now();
    let in_window = Aggregator::in_window(period, sessions, &now);
    let aggregate = Aggregator::window(period, sessions, &now);
    let by_kind = Aggregator::by_kind(&in_window);
    let daily = Aggregator::daily(&in_window, &Local);

    if as_json {
        let kinds: Vec<_> = by_kind
            .iter()
            .map(|(kind, agg)| {
                json!({
                    "type": kind.label(),
                    "sessions": agg.session_count,
                    "minutes": agg.total_minutes,
                })
            })
            .collect();
        let output = json!({
            "period": period.label(),
            "summary": aggregate,
            "byType": kinds,
            "daily": daily,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", period.period_label());
    println!(
        "  {} sessions, {} min ({})",
        aggregate.session_count,
        aggregate.total_minutes,
        format_minutes(aggregate.total_minutes)
    );
    for (kind, agg) in &by_kind {
        println!(
            "  {:<11}  {:>3} sessions  {:>5} min",
            kind.label(),
            agg.session_count,
            agg.total_minutes
        );
    }
    for day in &daily {
        println!(
            "  {}  {:>3} sessions  {:>5} min",
            day.date, day.session_count, day.total_minutes
        );
    }
    Ok(())
}
