use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Application configuration loaded from environment variables.
/// Startup fails if `OPENAI_API_KEY` is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub allowed_origin: String,
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmSettings,
    /// `None` disables truncation of the résumé body.
    pub max_resume_chars: Option<usize>,
    pub max_upload_bytes: usize,
}

/// Everything the outbound chat-completion call needs besides the key.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Candidate endpoints, tried in this order.
    pub endpoints: Vec<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests never touch process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("Required environment variable 'OPENAI_API_KEY' is not set")?;

        let endpoints = parse_endpoints(
            &lookup("LLM_ENDPOINTS").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        );
        if endpoints.is_empty() {
            bail!("LLM_ENDPOINTS must list at least one URL");
        }

        let max_resume_chars: usize = parse_or(&lookup, "MAX_RESUME_CHARS", 2000)?;

        Ok(Config {
            openai_api_key,
            allowed_origin: lookup("ALLOWED_ORIGIN")
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            port: parse_or(&lookup, "PORT", 8000)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm: LlmSettings {
                endpoints,
                model: lookup("LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
                temperature: parse_or(&lookup, "LLM_TEMPERATURE", 0.7)?,
                max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", 1000)?,
                timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 10)?),
            },
            max_resume_chars: (max_resume_chars > 0).then_some(max_resume_chars),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
        })
    }
}

/// Splits a comma-separated endpoint list, keeping order and dropping blanks.
pub fn parse_endpoints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Config pointing at the given endpoints, with the production defaults otherwise.
    pub fn for_endpoints(endpoints: Vec<String>) -> Self {
        Config {
            openai_api_key: "test-key".to_string(),
            allowed_origin: "http://localhost:3000".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            llm: LlmSettings {
                endpoints,
                model: "gpt-4o-mini".to_string(),
                temperature: 0.7,
                max_tokens: 1000,
                timeout: Duration::from_secs(2),
            },
            max_resume_chars: Some(2000),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}
