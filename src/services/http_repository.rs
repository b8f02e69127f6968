//! HTTP-backed remote session repository
//!
//! Talks to a document store exposing the per-user layout as REST paths:
//! `GET {base}/users/{uid}/sessions`, `PUT|DELETE {base}/users/{uid}/sessions/{sid}`,
//! `GET|PUT {base}/users/{uid}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::remote::{SessionRepository, DEFAULT_REMOTE_TIMEOUT};
use crate::types::{PomosyncError, Result, SessionRecord, UserPreferences};

pub struct HttpRepository {
    client: Client,
    base_url: Url,
}

impl HttpRepository {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REMOTE_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PomosyncError::Config(format!("Invalid remote URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PomosyncError::Config(format!(
                "Remote URL cannot be a base: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PomosyncError::Config(format!("HTTP client error: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// `{base}/users/{user_id}[/sessions[/{session_id}]]`, each segment escaped
    pub fn document_url(&self, user_id: &str, session_id: Option<&str>, sessions: bool) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(user_id);
            if sessions {
                segments.push("sessions");
                if let Some(id) = session_id {
                    segments.push(id);
                }
            }
        }
        url
    }
}

/// Transport-level failures are always retryable
fn transport_error(operation: &str, e: reqwest::Error) -> PomosyncError {
    if e.is_timeout() {
        PomosyncError::TransientNetwork(format!("{} timed out: {}", operation, e))
    } else {
        PomosyncError::TransientNetwork(format!("{} failed: {}", operation, e))
    }
}

fn status_error(operation: &str, status: StatusCode) -> PomosyncError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        PomosyncError::TransientNetwork(format!("{} returned {}", operation, status))
    } else {
        PomosyncError::RemoteWrite(format!("{} returned {}", operation, status))
    }
}

#[async_trait]
impl SessionRepository for HttpRepository {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_all(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
        let url = self.document_url(user_id, None, true);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("fetch sessions", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(PomosyncError::TransientNetwork(format!(
                "fetch sessions returned {}",
                status
            )));
        }

        let records: Vec<SessionRecord> = response
            .json()
            .await
            .map_err(|e| PomosyncError::TransientNetwork(format!("JSON parse error: {}", e)))?;
        debug!(count = records.len(), user_id, "fetched remote sessions");
        Ok(records)
    }

    async fn put(&self, user_id: &str, record: &SessionRecord) -> Result<()> {
        let url = self.document_url(user_id, Some(&record.id), true);
        let response = self
            .client
            .put(url)
            .json(record)
            .send()
            .await
            .map_err(|e| transport_error("put session", e))?;

        if !response.status().is_success() {
            return Err(status_error("put session", response.status()));
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str, session_id: &str) -> Result<()> {
        let url = self.document_url(user_id, Some(session_id), true);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| transport_error("delete session", e))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(status_error("delete session", status))
    }

    async fn fetch_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>> {
        let url = self.document_url(user_id, None, false);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("fetch preferences", e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(PomosyncError::TransientNetwork(format!(
                "fetch preferences returned {}",
                status
            )));
        }

        let prefs = response
            .json()
            .await
            .map_err(|e| PomosyncError::TransientNetwork(format!("JSON parse error: {}", e)))?;
        Ok(Some(prefs))
    }

    async fn put_preferences(&self, preferences: &UserPreferences) -> Result<()> {
        let url = self.document_url(&preferences.user_id, None, false);
        let response = self
            .client
            .put(url)
            .json(preferences)
            .send()
            .await
            .map_err(|e| PomosyncError::PreferenceUpdate(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PomosyncError::PreferenceUpdate(format!(
                "save preferences returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
