use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_API_URL;
use crate::roles::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub anthropic_api_url: String,
    /// Total attempts per LLM call. 1 means a single call with no retry.
    pub llm_max_attempts: u32,
    /// Per-request timeout for LLM calls. `None` leaves the call unbounded.
    pub llm_timeout_secs: Option<u64>,
    /// Sessions not seen for this long are evicted.
    pub session_idle_secs: u64,
    pub max_sessions: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_max_attempts = std::env::var("LLM_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u32>()
            .context("LLM_MAX_ATTEMPTS must be a positive integer")?;
        if llm_max_attempts == 0 {
            bail!("LLM_MAX_ATTEMPTS must be at least 1");
        }

        let llm_timeout_secs = match std::env::var("LLM_TIMEOUT_SECS") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            ),
            Err(_) => None,
        };

        let session_idle_secs = match std::env::var("SESSION_IDLE_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("SESSION_IDLE_SECS must be a number of seconds")?,
            Err(_) => DEFAULT_SESSION_IDLE.as_secs(),
        };

        let max_sessions = match std::env::var("MAX_SESSIONS") {
            Ok(raw) => raw
                .parse::<usize>()
                .context("MAX_SESSIONS must be a positive integer")?,
            Err(_) => DEFAULT_MAX_SESSIONS,
        };
        if max_sessions == 0 {
            bail!("MAX_SESSIONS must be at least 1");
        }

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            anthropic_api_url: std::env::var("ANTHROPIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            llm_max_attempts,
            llm_timeout_secs,
            session_idle_secs,
            max_sessions,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
