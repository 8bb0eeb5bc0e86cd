use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tokio::time::timeout;
use tracing::debug;

use crate::config::TrackerSettings;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("tracker request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("tracker returned HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    pub id: u64,
    pub project_id: u64,
    pub name: String,
}

/// Tracker workflow states, ordered the way the Tracker UI presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryState {
    Accepted,
    Delivered,
    Finished,
    Started,
    Rejected,
    Planned,
    Unstarted,
    Unscheduled,
}

impl StoryState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Delivered => "delivered",
            Self::Finished => "finished",
            Self::Started => "started",
            Self::Rejected => "rejected",
            Self::Planned => "planned",
            Self::Unstarted => "unstarted",
            Self::Unscheduled => "unscheduled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    pub project_id: u64,
    pub name: String,
    pub url: String,
    pub current_state: StoryState,
    #[serde(default)]
    pub blockers: Option<Vec<Blocker>>,
    #[serde(default)]
    pub labels: Option<Vec<Label>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    pub id: u64,
    pub story_id: u64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: u64,
    pub kind: String,
    pub name: String,
}

/// Read-only client for the Tracker v5 project API.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    http_client: reqwest::Client,
    settings: TrackerSettings,
}

impl TrackerClient {
    pub fn new(settings: TrackerSettings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            settings,
        }
    }

    pub async fn epics_with_label(&self, label: &str) -> Result<Vec<Epic>, TrackerError> {
        self.get_project_json(&format!("epics?filter={label}")).await
    }

    pub async fn stories_with_label(&self, label: &str) -> Result<Vec<Story>, TrackerError> {
        self.get_project_json(&format!("stories?with_label={label}"))
            .await
    }

    pub async fn blockers_for_story(&self, story_id: u64) -> Result<Vec<Blocker>, TrackerError> {
        self.get_project_json(&format!("stories/{story_id}/blockers"))
            .await
    }

    pub async fn labels_for_story(&self, story_id: u64) -> Result<Vec<Label>, TrackerError> {
        self.get_project_json(&format!("stories/{story_id}/labels"))
            .await
    }

    async fn get_project_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TrackerError> {
        let url = format!(
            "{}/projects/{}/{path}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.project_id
        );

        debug!(url = %url, "sending tracker request");

        let timeout_duration = Duration::from_millis(self.settings.request_timeout_ms);
        let response = match timeout(timeout_duration, self.get_once(&url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(TrackerError::Timeout {
                    timeout_ms: self.settings.request_timeout_ms,
                });
            }
        };

        Ok(response.json().await?)
    }

    async fn get_once(&self, url: &str) -> Result<reqwest::Response, TrackerError> {
        let response = self
            .http_client
            .get(url)
            .header("X-TrackerToken", &self.settings.tracker_token)
            .send()
            .await?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error response body>".to_owned());
    Err(TrackerError::HttpStatus { status, body })
}
