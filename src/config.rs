use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,

    // Rate limiting
    pub rate_protected_per_min: u32,

    /// Seconds a year's holiday periods stay cached
    pub holiday_cache_ttl_secs: u64,

    pub api_prefix: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value `{raw}`: {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parsed_or("LOG_LEVEL", tracing::Level::DEBUG)?,

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,
            holiday_cache_ttl_secs: parsed_or("HOLIDAY_CACHE_TTL_SECS", 3600)?, // 1 hour

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        })
    }

    /// Settings for handler tests; nothing is read from the environment.
    #[cfg(test)]
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: "mysql://localhost/hrm_test".to_string(),
            jwt_secret: jwt_secret.to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
            rate_protected_per_min: 1000,
            holiday_cache_ttl_secs: 60,
            api_prefix: "/api/v1".to_string(),
        }
    }
}
