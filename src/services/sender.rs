//! Report delivery collaborator
//!
//! Transport is out of scope: the shipped sender drops each rendered report
//! into an outbox directory for a mailer (or a human) to pick up.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::types::{PomosyncError, Result};

#[async_trait]
pub trait ReportSender: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, content: &str) -> Result<()>;
}

/// Writes each report to `<outbox_dir>/<timestamp>-<recipient>.html`
pub struct OutboxSender {
    outbox_dir: PathBuf,
}

impl OutboxSender {
    pub fn new(outbox_dir: PathBuf) -> Self {
        Self { outbox_dir }
    }

    pub fn outbox_dir(&self) -> &PathBuf {
        &self.outbox_dir
    }

    fn file_name(recipient: &str) -> String {
        let safe: String = recipient
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}-{}.html", Utc::now().format("%Y%m%dT%H%M%S%.6f"), safe)
    }
}

#[async_trait]
impl ReportSender for OutboxSender {
    async fn send(&self, recipient: &str, subject: &str, content: &str) -> Result<()> {
        if recipient.trim().is_empty() {
            return Err(PomosyncError::Config("report recipient is empty".into()));
        }
        tokio::fs::create_dir_all(&self.outbox_dir).await?;

        let path = self.outbox_dir.join(Self::file_name(recipient));
        let document = format!(
            "<!-- To: {} -->\n<!-- Subject: {} -->\n{}",
            recipient, subject, content
        );
        tokio::fs::write(&path, document).await?;

        info!(recipient, path = %path.display(), "report written to outbox");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_outbox_writes_report() {
        let temp = TempDir::new().unwrap();
        let sender = OutboxSender::new(temp.path().join("outbox"));

        sender
            .send("a@example.com", "Weekly", "<p>hi</p>")
            .await
            .unwrap();

        let files: Vec<_> = std::fs::read_dir(sender.outbox_dir())
            .unwrap()
            .flatten()
            .collect();
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().to_string_lossy().to_string();
        assert!(name.ends_with("-a_example.com.html"));
        let body = std::fs::read_to_string(files[0].path()).unwrap();
        assert!(body.contains("<!-- To: a@example.com -->"));
        assert!(body.ends_with("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_outbox_rejects_empty_recipient() {
        let temp = TempDir::new().unwrap();
        let sender = OutboxSender::new(temp.path().to_path_buf());

        assert!(sender.send("  ", "s", "c").await.is_err());
    }
}
