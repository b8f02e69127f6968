//! Summary report rendering
//!
//! Pure functions of their inputs: no clock, storage or network access, so
//! identical inputs render byte-identical documents.

use std::fmt::Display;

use chrono::{Local, TimeZone};

use super::aggregator::format_minutes;
use crate::types::{Aggregate, SessionRecord};

/// Maximum number of sessions listed in a report table
pub const DEFAULT_RECENT_LIMIT: usize = 10;

const ROW_EVEN: &str = "#ffffff";
const ROW_ODD: &str = "#f4f1fb";
const ACCENT: &str = "#7b5cd6";

/// Output markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Html,
    Text,
}

pub struct ReportRenderer<Tz: TimeZone> {
    tz: Tz,
    recent_limit: usize,
}

impl ReportRenderer<Local> {
    /// Renderer formatting dates in the system timezone
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl<Tz: TimeZone> ReportRenderer<Tz>
where
    Tz::Offset: Display,
{
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }

    pub fn with_recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }

    /// Email subject line for a period
    pub fn subject(period_label: &str) -> String {
        format!("Your Pomodoro Summary: {}", period_label)
    }

    pub fn render_as(
        &self,
        format: ReportFormat,
        aggregate: &Aggregate,
        recent_work: &[SessionRecord],
        period_label: &str,
    ) -> String {
        match format {
            ReportFormat::Html => self.render(aggregate, recent_work, period_label),
            ReportFormat::Text => self.render_text(aggregate, recent_work, period_label),
        }
    }

    /// HTML report. `recent_work` is expected newest first; only the first
    /// `recent_limit` entries are listed.
    pub fn render(
        &self,
        aggregate: &Aggregate,
        recent_work: &[SessionRecord],
        period_label: &str,
    ) -> String {
        let label = escape_html(period_label);
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!(
            "<title>{}</title>\n</head>\n",
            escape_html(&Self::subject(period_label))
        ));
        html.push_str(
            "<body style=\"font-family: -apple-system, Helvetica, Arial, sans-serif; color: #222;\">\n",
        );
        html.push_str(&format!(
            "<h1 style=\"color: {};\">Pomodoro Summary &mdash; {}</h1>\n",
            ACCENT, label
        ));

        html.push_str("<table style=\"border-collapse: collapse; margin-bottom: 24px;\">\n");
        html.push_str(&summary_row("Total sessions", &aggregate.session_count.to_string()));
        html.push_str(&summary_row(
            "Total minutes",
            &aggregate.total_minutes.to_string(),
        ));
        html.push_str(&summary_row(
            "Time focused",
            &format_minutes(aggregate.total_minutes),
        ));
        html.push_str("</table>\n");

        html.push_str("<h2>Recent work sessions</h2>\n");
        let rows: Vec<&SessionRecord> = recent_work.iter().take(self.recent_limit).collect();
        if rows.is_empty() {
            html.push_str("<p>No work sessions in this period.</p>\n");
        } else {
            html.push_str("<table style=\"border-collapse: collapse; width: 100%;\">\n");
            html.push_str(&format!(
                "<tr style=\"background: {}; color: #fff;\"><th align=\"left\">Date</th><th align=\"left\">Type</th><th align=\"right\">Duration</th></tr>\n",
                ACCENT
            ));
            for (index, session) in rows.iter().enumerate() {
                let background = if index % 2 == 0 { ROW_EVEN } else { ROW_ODD };
                html.push_str(&format!(
                    "<tr style=\"background: {};\"><td>{}</td><td>{}</td><td align=\"right\">{} min</td></tr>\n",
                    background,
                    self.format_date(session),
                    escape_html(session.kind.label()),
                    session.duration_minutes
                ));
            }
            html.push_str("</table>\n");
        }

        html.push_str("<p style=\"color: #888; font-size: 12px;\">Keep up the focus!</p>\n");
        html.push_str("</body>\n</html>\n");
        html
    }

    /// Plain-text report with the same content as [`render`](Self::render)
    pub fn render_text(
        &self,
        aggregate: &Aggregate,
        recent_work: &[SessionRecord],
        period_label: &str,
    ) -> String {
        let mut text = format!("Pomodoro Summary - {}\n\n", period_label);
        text.push_str(&format!("  Total sessions: {}\n", aggregate.session_count));
        text.push_str(&format!("  Total minutes:  {}\n", aggregate.total_minutes));
        text.push_str(&format!(
            "  Time focused:   {}\n\n",
            format_minutes(aggregate.total_minutes)
        ));

        text.push_str("Recent work sessions\n");
        let rows: Vec<&SessionRecord> = recent_work.iter().take(self.recent_limit).collect();
        if rows.is_empty() {
            text.push_str("  (none)\n");
        }
        for session in rows {
            text.push_str(&format!(
                "  {}  {:<11}  {:>4} min\n",
                self.format_date(session),
                session.kind.label(),
                session.duration_minutes
            ));
        }
        text
    }

    fn format_date(&self, session: &SessionRecord) -> String {
        session
            .timestamp
            .with_timezone(&self.tz)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}

fn summary_row(label: &str, value: &str) -> String {
    format!(
        "<tr><td style=\"padding: 4px 16px 4px 0;\">{}</td><td style=\"padding: 4px 0;\"><strong>{}</strong></td></tr>\n",
        label, value
    )
}

/// Minimal HTML escaping for text content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
