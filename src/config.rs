use crate::error::{Error, Result};
use dotenvy::dotenv;
use secrecy::SecretString;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_AGGREGATION_INTERVAL_SECS: u64 = 86_400;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_FEEDBACK_RPS: u32 = 20;

#[derive(Debug)]
pub struct Config {
    pub server_address: String,
    pub webhook_secret: SecretString,
    pub database: Option<DatabaseConfig>,
    pub aggregation_interval: Duration,
    pub store_timeout: Duration,
    pub feedback_rps: u32,
    pub log_json: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_opt = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let webhook_secret = get_opt("DODO_WEBHOOK_SECRET").ok_or_else(|| {
            Error::Config("Missing environment variable: DODO_WEBHOOK_SECRET".to_string())
        })?;

        let database = get_opt("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            name: get_opt("DATABASE_NAME"),
        });

        Ok(Self {
            server_address: get_opt("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
            webhook_secret: SecretString::new(webhook_secret),
            database,
            aggregation_interval: Duration::from_secs(parse_positive(
                "AGGREGATION_INTERVAL_SECS",
                get_opt("AGGREGATION_INTERVAL_SECS"),
                DEFAULT_AGGREGATION_INTERVAL_SECS,
            )?),
            store_timeout: Duration::from_secs(parse_positive(
                "STORE_TIMEOUT_SECS",
                get_opt("STORE_TIMEOUT_SECS"),
                DEFAULT_STORE_TIMEOUT_SECS,
            )?),
            feedback_rps: parse_or("FEEDBACK_RPS", get_opt("FEEDBACK_RPS"), DEFAULT_FEEDBACK_RPS)?,
            log_json: get_opt("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

/// Like `parse_or`, but zero is rejected. Used for durations in seconds.
fn parse_positive(name: &str, raw: Option<String>, default: u64) -> Result<u64> {
    match parse_or(name, raw, default)? {
        0 => Err(Error::Config(format!("{} must be at least 1", name))),
        secs => Ok(secs),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Option<&'static Config> {
    CONFIG.get()
}
