use std::time::Duration;

use crate::app_config::{AppConfig, Environment, PollSchedule};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; absent variables take their documented default.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("MONOBOOK_ENV", "development"))?;
    let log_level = or_default("MONOBOOK_LOG_LEVEL", "info");

    let poll_schedule = PollSchedule {
        fast_interval: Duration::from_millis(parse_u64("MONOBOOK_POLL_FAST_INTERVAL_MS", "250")?),
        fast_attempts: parse_u32("MONOBOOK_POLL_FAST_ATTEMPTS", "12")?,
        slow_interval: Duration::from_millis(parse_u64(
            "MONOBOOK_POLL_SLOW_INTERVAL_MS",
            "1000",
        )?),
        slow_attempts: parse_u32("MONOBOOK_POLL_SLOW_ATTEMPTS", "20")?,
    };
    if poll_schedule.total_attempts() == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MONOBOOK_POLL_FAST_ATTEMPTS".to_string(),
            reason: "total poll attempt budget must be at least 1".to_string(),
        });
    }

    let max_extract_depth = parse_usize("MONOBOOK_MAX_EXTRACT_DEPTH", "32")?;
    if max_extract_depth == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MONOBOOK_MAX_EXTRACT_DEPTH".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let bridge_call_timeout = match parse_u64("MONOBOOK_BRIDGE_CALL_TIMEOUT_MS", "0")? {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };

    let default_currency = or_default("MONOBOOK_CURRENCY", "USD").to_ascii_uppercase();
    if default_currency.len() != 3 || !default_currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::InvalidEnvVar {
            var: "MONOBOOK_CURRENCY".to_string(),
            reason: format!("'{default_currency}' is not a three-letter currency code"),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        poll_schedule,
        max_extract_depth,
        bridge_call_timeout,
        default_currency,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for values other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MONOBOOK_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
