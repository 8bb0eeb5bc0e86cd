use std::env;

use anyhow::{Context, Result, ensure};

pub const DEFAULT_TRACKER_BASE_URL: &str = "https://www.pivotaltracker.com/services/v5";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub tracker_token: String,
    pub project_id: String,
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl TrackerSettings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present, but do not fail if file does not exist.
        let _ = dotenvy::dotenv();

        let tracker_token =
            env::var("PIVOTAL_TRACKER_TOKEN").context("PIVOTAL_TRACKER_TOKEN must be set")?;
        ensure!(
            !tracker_token.trim().is_empty(),
            "PIVOTAL_TRACKER_TOKEN cannot be empty"
        );

        let project_id = env::var("PROJECT_ID").context("PROJECT_ID must be set")?;
        ensure!(!project_id.trim().is_empty(), "PROJECT_ID cannot be empty");

        let base_url =
            env::var("TRACKER_BASE_URL").unwrap_or_else(|_| DEFAULT_TRACKER_BASE_URL.to_owned());
        ensure!(
            !base_url.trim().is_empty(),
            "TRACKER_BASE_URL cannot be empty"
        );

        let request_timeout_ms = parse_u64_env("TRACKER_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?;
        ensure!(
            request_timeout_ms > 0,
            "TRACKER_TIMEOUT_MS must be greater than 0"
        );

        Ok(Self {
            tracker_token,
            project_id,
            base_url,
            request_timeout_ms,
        })
    }
}

fn parse_u64_env(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("failed to parse {name} as u64")),
        Err(_) => Ok(default),
    }
}
