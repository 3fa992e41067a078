use std::env;

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "dev-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub log_level: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_days: i64,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_timeout_seconds: u64,
    pub gemini_temperature: f32,
    pub gemini_top_k: i32,
    pub gemini_top_p: f32,
    pub gemini_max_output_tokens: i32,
    pub huggingface_api_key: String,
    pub huggingface_model: String,
    pub huggingface_endpoint: String,
    pub huggingface_timeout_seconds: u64,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_i32(name: &str, default: i32) -> i32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .unwrap_or(default)
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(default)
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_database_url(value: String) -> String {
    if value.starts_with("sqlite+aiosqlite://") {
        return value.replacen("sqlite+aiosqlite://", "sqlite://", 1);
    }
    value
}

impl Config {
    pub fn load() -> Result<Self> {
        let jwt_secret = env_string("JWT_SECRET", DEFAULT_JWT_SECRET);
        if jwt_secret == DEFAULT_JWT_SECRET {
            warn!("JWT_SECRET not set; using the insecure development default");
        }

        Ok(Config {
            server_host: env_string("SERVER_HOST", "0.0.0.0"),
            server_port: env_u16("SERVER_PORT", 5000),
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            database_url: normalize_database_url(env_string(
                "DATABASE_URL",
                "sqlite://chat_app.db",
            )),
            jwt_secret,
            jwt_expires_days: env_i64("JWT_EXPIRES_DAYS", 30),
            gemini_api_key: env_string("GEMINI_API_KEY", ""),
            gemini_model: env_string("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_timeout_seconds: env_u64("GEMINI_TIMEOUT_SECONDS", 30),
            gemini_temperature: env_f32("GEMINI_TEMPERATURE", 0.7),
            gemini_top_k: env_i32("GEMINI_TOP_K", 40),
            gemini_top_p: env_f32("GEMINI_TOP_P", 0.95),
            gemini_max_output_tokens: env_i32("GEMINI_MAX_OUTPUT_TOKENS", 2048),
            huggingface_api_key: env_string("HUGGINGFACE_API_KEY", ""),
            huggingface_model: env_string("HUGGINGFACE_MODEL", "gpt2"),
            huggingface_endpoint: env_string(
                "HUGGINGFACE_ENDPOINT",
                "https://api-inference.huggingface.co/models",
            ),
            huggingface_timeout_seconds: env_u64("HUGGINGFACE_TIMEOUT_SECONDS", 10),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_legacy_sqlite_scheme() {
        let normalized = normalize_database_url("sqlite+aiosqlite:///chat_app.db".to_string());
        assert_eq!(normalized, "sqlite:///chat_app.db");
    }

    #[test]
    fn leaves_plain_sqlite_urls_alone() {
        let url = "sqlite://chat_app.db".to_string();
        assert_eq!(normalize_database_url(url.clone()), url);
    }
}
