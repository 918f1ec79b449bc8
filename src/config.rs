//! Configuration module
//!
//! Everything is read from environment variables (a `.env` file is honoured
//! when present). Every setting has a default, so an empty environment
//! yields a runnable local service.
//!
//! | Variable | Default |
//! |---|---|
//! | `APP_ADDR` | `0.0.0.0:5000` |
//! | `HTTPS_PORT` | unset (no redirect) |
//! | `JWT_SECRET` | built-in development secret |
//! | `JWT_ISSUER` | `UserManagementAPI` |
//! | `JWT_AUDIENCE` | `UserManagementAPIClients` |
//! | `JWT_TTL_SECS` | `3600` |
//! | `AUTH_USERNAME` / `AUTH_PASSWORD` | `admin` / `password123` |
//! | `LOG_FORMAT` | `pretty` (`json` for JSON lines) |

use std::net::SocketAddr;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

use crate::token::{DEFAULT_SECRET, TokenConfig};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {details}")]
    Parse { key: &'static str, details: String },
}

/// The one account allowed to log in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
    /// Role claim put into tokens issued for this account.
    pub role: String,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password123".to_string(),
            role: "Admin".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    /// Port HTTP requests are redirected to. `None` disables the redirect.
    pub https_port: Option<u16>,
    pub token: TokenConfig,
    pub account: Account,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            https_port: None,
            token: TokenConfig::default(),
            account: Account::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let lifetime = match parse::<i64>(&lookup, "JWT_TTL_SECS")? {
            Some(secs) => token_lifetime(secs)?,
            None => defaults.token.lifetime,
        };

        Ok(Self {
            addr: parse(&lookup, "APP_ADDR")?.unwrap_or(defaults.addr),
            https_port: parse(&lookup, "HTTPS_PORT")?,
            token: TokenConfig {
                secret: get("JWT_SECRET").unwrap_or(defaults.token.secret),
                issuer: get("JWT_ISSUER").unwrap_or(defaults.token.issuer),
                audience: get("JWT_AUDIENCE").unwrap_or(defaults.token.audience),
                lifetime,
            },
            account: Account {
                username: get("AUTH_USERNAME").unwrap_or(defaults.account.username),
                password: get("AUTH_PASSWORD").unwrap_or(defaults.account.password),
                role: defaults.account.role,
            },
            log_format: match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }

    /// Whether tokens are signed with the built-in development secret.
    pub fn uses_default_secret(&self) -> bool {
        self.token.secret == DEFAULT_SECRET
    }
}

/// Longest token lifetime `JWT_TTL_SECS` may ask for: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

fn token_lifetime(secs: i64) -> Result<Duration, ConfigError> {
    Duration::try_seconds(secs)
        .filter(|_| (1..=MAX_TOKEN_TTL_SECS).contains(&secs))
        .ok_or_else(|| ConfigError::Parse {
            key: "JWT_TTL_SECS",
            details: format!("{secs} is outside 1..={MAX_TOKEN_TTL_SECS} seconds"),
        })
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Parse { key, details: e.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = from_pairs(&[]).unwrap();

        assert_eq!(config.addr, "0.0.0.0:5000".parse().unwrap());
        assert_eq!(config.https_port, None);
        assert_eq!(config.token.issuer, "UserManagementAPI");
        assert_eq!(config.token.lifetime, Duration::hours(1));
        assert_eq!(config.account, Account::default());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn variables_override_defaults() {
        let config = from_pairs(&[
            ("APP_ADDR", "127.0.0.1:8080"),
            ("HTTPS_PORT", "8443"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_SECS", "60"),
            ("AUTH_USERNAME", "root"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.https_port, Some(8443));
        assert_eq!(config.token.lifetime, Duration::seconds(60));
        assert_eq!(config.account.username, "root");
        assert_eq!(config.account.password, "password123");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = from_pairs(&[("HTTPS_PORT", "  "), ("JWT_SECRET", "")]).unwrap();
        assert_eq!(config.https_port, None);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn token_lifetime_must_be_positive_and_bounded() {
        let huge = i64::MAX.to_string();
        let too_long = (MAX_TOKEN_TTL_SECS + 1).to_string();

        for ttl in ["0", "-5", too_long.as_str(), "10000000000000", huge.as_str()] {
            let err = from_pairs(&[("JWT_TTL_SECS", ttl)]).unwrap_err();
            assert!(matches!(err, ConfigError::Parse { key: "JWT_TTL_SECS", .. }), "{ttl} accepted");
        }

        let year = from_pairs(&[("JWT_TTL_SECS", MAX_TOKEN_TTL_SECS.to_string().as_str())]).unwrap();
        assert_eq!(year.token.lifetime, Duration::days(365));
    }

    #[test]
    fn unparseable_values_name_the_variable() {
        let err = from_pairs(&[("HTTPS_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { key: "HTTPS_PORT", .. }));
    }
}
