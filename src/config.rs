//! Runtime configuration
//!
//! Read once at startup from the process environment (after `.env` is
//! loaded by `dotenvy`). Numeric settings that fail to parse fall back to
//! their defaults with a warning rather than aborting startup.

use std::time::Duration;

use crate::error::{AssistantError, Result};

const DEFAULT_RATE_LIMIT: usize = 10;
const DEFAULT_RATE_WINDOW_SECS: u64 = 60;
const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Supabase project credentials (service role)
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: String,
}

/// OpenAI-compatible chat completion endpoint used for free-form chat
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

/// Per-user request budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT,
            window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub database_url: String,
    pub supabase: SupabaseConfig,
    /// `None` disables LLM-backed chat; general chat answers with a canned reply
    pub llm: Option<LlmConfig>,
    pub rate_limit: RateLimitConfig,
    /// Offset used to decide what "today" means for the stores
    pub utc_offset_hours: i32,
    pub port: u16,
}

impl AssistantConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = required("DATABASE_URL")?;
        let supabase = SupabaseConfig {
            url: required("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
        };

        let llm = match (
            std::env::var("LLM_API_URL").ok(),
            std::env::var("LLM_API_KEY").ok(),
        ) {
            (Some(api_url), Some(api_key)) if !api_url.is_empty() && !api_key.is_empty() => {
                Some(LlmConfig {
                    api_url,
                    api_key,
                    model: std::env::var("LLM_MODEL")
                        .unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
                })
            }
            _ => {
                tracing::warn!("LLM_API_URL/LLM_API_KEY not set, general chat uses canned replies");
                None
            }
        };

        let rate_limit = RateLimitConfig {
            max_requests: parsed_or("ASSISTANT_RATE_LIMIT", DEFAULT_RATE_LIMIT),
            window: Duration::from_secs(parsed_or(
                "ASSISTANT_RATE_WINDOW_SECS",
                DEFAULT_RATE_WINDOW_SECS,
            )),
        };

        Ok(Self {
            database_url,
            supabase,
            llm,
            rate_limit,
            utc_offset_hours: parsed_or("ASSISTANT_UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS),
            port: parsed_or("PORT", DEFAULT_PORT),
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AssistantError::Config(format!("{name} environment variable not set")))
}

fn parsed_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match std::env::var(name) {
        Ok(raw) => parse_or(name, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(name: &str, raw: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!("Invalid {}={:?}, using default {}", name, raw, default);
        default
    })
}
