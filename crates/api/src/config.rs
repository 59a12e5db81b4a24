//! Environment-driven server configuration.
//!
//! | Env var                  | Default                   |
//! |--------------------------|---------------------------|
//! | `DATABASE_URL`           | required                  |
//! | `JWT_SECRET`             | required                  |
//! | `JWT_ACCESS_EXPIRY_MINS` | `1440`                    |
//! | `HOST`                   | `0.0.0.0`                 |
//! | `PORT`                   | `3000`                    |
//! | `CORS_ORIGINS`           | `http://localhost:5173`   |
//! | `REQUEST_TIMEOUT_SECS`   | `30`                      |
//! | `DB_MAX_CONNECTIONS`     | `20`                      |
//! | `LOG_FORMAT`             | `text` (`json` to switch) |

use std::str::FromStr;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by CORS, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub db_max_connections: u32,
    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            access_token_expiry_mins: parsed("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS)?,
        };
        if jwt.access_token_expiry_mins <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_ACCESS_EXPIRY_MINS",
                value: jwt.access_token_expiry_mins.to_string(),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed("PORT", 3000)?,
            cors_origins: parse_origins(
                &optional("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()),
            ),
            request_timeout_secs: parsed("REQUEST_TIMEOUT_SECS", 30)?,
            db_max_connections: parsed(
                "DB_MAX_CONNECTIONS",
                gigledger_db::DEFAULT_MAX_CONNECTIONS,
            )?,
            json_logs: optional("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            jwt,
        })
    }
}

/// A set, non-blank variable.
fn optional(var: &'static str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn parsed<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
