use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::info;

/// Upper bound for `SESSION_TTL_HOURS`: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Configuration structure for environment variables
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
    pub bind_addr: String,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:database.db?mode=rwc".to_string()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            session_ttl_hours: check_session_ttl(parse_var("SESSION_TTL_HOURS", 24)?)?,
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5001".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
        })
    }

    /// Settings for tests: in-memory database and the cheapest bcrypt cost.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            session_ttl_hours: 24,
            cookie_secure: false,
            bcrypt_cost: 4,
            bind_addr: "127.0.0.1:0".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error + Send + Sync>>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid {key} value '{raw}': {e}").into()),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn check_session_ttl(hours: i64) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
    if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(format!(
            "Invalid SESSION_TTL_HOURS value '{hours}': expected 1 to {MAX_SESSION_TTL_HOURS}"
        )
        .into())
    }
}
