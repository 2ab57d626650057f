use crate::error::{ForumError, Result};
use crate::models::OffsetEncoding;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub moderation: ModerationConfig,
    pub ner: NerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub http_port: u16,
    pub service_name: String,
    pub environment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Public forum host used in cross-reference permalinks, without protocol
    pub client_url: String,
    pub profanity_words_path: String,
    pub post_cooldown_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NerConfig {
    pub api_url: String,
    pub api_token: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub offset_encoding: OffsetEncoding,
}

impl NerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ModerationConfig {
    pub fn post_cooldown(&self) -> Duration {
        Duration::from_secs(self.post_cooldown_secs)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            service: ServiceConfig {
                http_port: parse_var("HTTP_PORT", "8090")?,
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "forum-service".to_string()),
                environment: env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string()),
            },
            database: DatabaseConfig {
                url: required_var("DATABASE_URL")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", "10")?,
            },
            moderation: ModerationConfig {
                client_url: strip_protocol(&required_var("CLIENT_URL")?),
                profanity_words_path: env::var("PROFANITY_WORDS_PATH")
                    .unwrap_or_else(|_| "data/profanity_words.txt".to_string()),
                post_cooldown_secs: parse_var("POST_COOLDOWN_SECS", "60")?,
            },
            ner: NerConfig {
                api_url: env::var("NER_API_URL")
                    .unwrap_or_else(|_| "https://viettelgroup.ai/nlp/api/v1/ner".to_string()),
                api_token: required_var("NER_API_TOKEN")?,
                timeout_ms: parse_var("NER_TIMEOUT_MS", "5000")?,
                max_retries: parse_var("NER_MAX_RETRIES", "0")?,
                offset_encoding: parse_var("NER_OFFSET_ENCODING", "utf16")?,
            },
        })
    }
}

fn required_var(key: &str) -> Result<String> {
    env::var(key).map_err(|_| ForumError::Config(format!("{} must be set", key)))
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| ForumError::Config(format!("{} has invalid value {:?}: {}", key, raw, e)))
}

/// Permalinks are built as `http://{client_url}/...`, so a scheme in the
/// configured value would be doubled.
fn strip_protocol(url: &str) -> String {
    let trimmed = url
        .trim()
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    trimmed.trim_end_matches('/').to_string()
}
