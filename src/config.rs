//! Server configuration from `CATALOG_*` environment variables.

use std::env;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

/// Settings of the catalog server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `CATALOG_BIND_ADDR`, default `0.0.0.0:8080`.
    pub bind_addr: String,
    /// `CATALOG_PUBLIC_BASE`: prefix of public gallery URLs.
    pub public_base: String,
    /// `CATALOG_UPLOAD_ENDPOINT`: where presigned uploads are sent.
    /// Defaults to the public base.
    pub upload_endpoint: String,
    /// `CATALOG_UPLOAD_EXPIRY_SECS`, default 60.
    pub upload_expiry: Duration,
    /// `CATALOG_ADMIN_TOKEN`: bearer token accepted for mutations. Without
    /// one, every mutation is refused.
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid { key: &'static str, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, message } => write!(f, "invalid {}: {}", key, message),
        }
    }
}

impl Error for ConfigError {}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE: &str = "http://localhost:8080/files";
const DEFAULT_UPLOAD_EXPIRY_SECS: u64 = 60;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = or_default(var("CATALOG_BIND_ADDR"), "CATALOG_BIND_ADDR", DEFAULT_BIND_ADDR);
        let public_base = or_default(
            var("CATALOG_PUBLIC_BASE"),
            "CATALOG_PUBLIC_BASE",
            DEFAULT_PUBLIC_BASE,
        )
        .trim_end_matches('/')
        .to_string();
        let upload_endpoint = var("CATALOG_UPLOAD_ENDPOINT")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| public_base.clone());
        let expiry_secs: u64 = parse(
            var("CATALOG_UPLOAD_EXPIRY_SECS"),
            "CATALOG_UPLOAD_EXPIRY_SECS",
            DEFAULT_UPLOAD_EXPIRY_SECS,
        )?;
        if expiry_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "CATALOG_UPLOAD_EXPIRY_SECS",
                message: "must be positive".into(),
            });
        }

        let admin_token = var("CATALOG_ADMIN_TOKEN");
        if admin_token.is_none() {
            warn!("CATALOG_ADMIN_TOKEN not set, mutations are disabled");
        }

        Ok(Self {
            bind_addr,
            public_base,
            upload_endpoint,
            upload_expiry: Duration::from_secs(expiry_secs),
            admin_token,
        })
    }
}

fn or_default(value: Option<String>, key: &str, default: &str) -> String {
    value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + fmt::Display,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                message: e.to_string(),
            }
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}
