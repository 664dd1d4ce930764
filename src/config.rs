//! Runtime configuration.
//!
//! Read from `BOX_OFFICE_*` environment variables (a `.env` file is honored)
//! with defaults for every key.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const CHANNEL_CAPACITY: &str = "BOX_OFFICE_CHANNEL_CAPACITY";
pub const SWEEP_INTERVAL_SECS: &str = "BOX_OFFICE_SWEEP_INTERVAL_SECS";
pub const PAYMENT_DELAY_MS: &str = "BOX_OFFICE_PAYMENT_DELAY_MS";
pub const DEFAULT_CURRENCY: &str = "BOX_OFFICE_DEFAULT_CURRENCY";
pub const CONFIRM_RETRIES: &str = "BOX_OFFICE_CONFIRM_RETRIES";
pub const SHUTDOWN_TIMEOUT_SECS: &str = "BOX_OFFICE_SHUTDOWN_TIMEOUT_SECS";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    NotANumber { key: &'static str, value: String },

    #[error("{key} is out of range: {reason}")]
    OutOfRange { key: &'static str, reason: String },
}

impl ConfigError {
    /// Configuration never fixes itself on retry.
    pub fn is_transient(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Buffer of every actor's request channel.
    pub channel_capacity: usize,
    /// How often live events are checked for having ended.
    pub sweep_interval: Duration,
    /// Simulated latency of the payment gateway.
    pub payment_delay: Duration,
    /// ISO code for ticket types created without one.
    pub default_currency: String,
    /// Retries of a payment confirmation that failed transiently.
    pub confirm_retries: u32,
    /// How long shutdown waits for the actors to drain.
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            sweep_interval: Duration::from_secs(60),
            payment_delay: Duration::ZERO,
            default_currency: "NGN".to_string(),
            confirm_retries: 3,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load from the process environment after reading `.env`, if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup. Missing or blank keys take their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let channel_capacity = match get(CHANNEL_CAPACITY) {
            Some(raw) => parse_number(CHANNEL_CAPACITY, &raw)? as usize,
            None => defaults.channel_capacity,
        };
        if channel_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                key: CHANNEL_CAPACITY,
                reason: "must be at least 1".into(),
            });
        }

        let sweep_interval = match get(SWEEP_INTERVAL_SECS) {
            Some(raw) => Duration::from_secs(parse_number(SWEEP_INTERVAL_SECS, &raw)?),
            None => defaults.sweep_interval,
        };
        if sweep_interval.is_zero() {
            return Err(ConfigError::OutOfRange {
                key: SWEEP_INTERVAL_SECS,
                reason: "must be at least 1 second".into(),
            });
        }

        let payment_delay = match get(PAYMENT_DELAY_MS) {
            Some(raw) => Duration::from_millis(parse_number(PAYMENT_DELAY_MS, &raw)?),
            None => defaults.payment_delay,
        };

        let default_currency = match get(DEFAULT_CURRENCY) {
            Some(raw) => {
                let code = raw.to_uppercase();
                if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ConfigError::OutOfRange {
                        key: DEFAULT_CURRENCY,
                        reason: format!("{raw:?} is not a three-letter currency code"),
                    });
                }
                code
            }
            None => defaults.default_currency,
        };

        let confirm_retries = match get(CONFIRM_RETRIES) {
            Some(raw) => u32::try_from(parse_number(CONFIRM_RETRIES, &raw)?).map_err(|_| {
                ConfigError::OutOfRange {
                    key: CONFIRM_RETRIES,
                    reason: "too large".into(),
                }
            })?,
            None => defaults.confirm_retries,
        };

        let shutdown_timeout = match get(SHUTDOWN_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(parse_number(SHUTDOWN_TIMEOUT_SECS, &raw)?),
            None => defaults.shutdown_timeout,
        };

        Ok(Self {
            channel_capacity,
            sweep_interval,
            payment_delay,
            default_currency,
            confirm_retries,
            shutdown_timeout,
        })
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse().map_err(|_| ConfigError::NotANumber {
        key,
        value: raw.to_string(),
    })
}
