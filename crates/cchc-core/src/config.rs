use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Dataset published by the monitoring pipeline.
pub const DEFAULT_DATASET_URL: &str = "https://update.wholemeaning.com/model/cchc.csv";

/// User agent sent when `CCHC_USER_AGENT` is unset or blank.
pub const DEFAULT_USER_AGENT: &str = "cchc-dashboard/0.1 (topic-analytics)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let dataset_url = or_default("CCHC_DATASET_URL", DEFAULT_DATASET_URL);
    validate_dataset_url(&dataset_url)?;

    let env = parse_environment(&or_default("CCHC_ENV", "development"))?;
    let bind_addr = parse_addr("CCHC_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CCHC_LOG_LEVEL", "info");

    let fetch_timeout_secs = parse_u64("CCHC_FETCH_TIMEOUT_SECS", "30")?;
    if fetch_timeout_secs == 0 {
        return Err(invalid(
            "CCHC_FETCH_TIMEOUT_SECS",
            "timeout must be greater than zero".to_string(),
        ));
    }
    let fetch_max_retries = parse_u32("CCHC_FETCH_MAX_RETRIES", "1")?;
    let fetch_retry_backoff_ms = parse_u64("CCHC_FETCH_RETRY_BACKOFF_MS", "500")?;
    let user_agent = or_default("CCHC_USER_AGENT", DEFAULT_USER_AGENT);

    let cache_ttl_secs = match lookup("CCHC_CACHE_TTL_SECS") {
        Ok(raw) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<u64>()
                .map_err(|e| invalid("CCHC_CACHE_TTL_SECS", e.to_string()))?,
        ),
        _ => None,
    };

    Ok(AppConfig {
        dataset_url,
        env,
        bind_addr,
        log_level,
        fetch_timeout_secs,
        fetch_max_retries,
        fetch_retry_backoff_ms,
        user_agent,
        cache_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CCHC_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Requires an absolute `http://` or `https://` URL with a host part, parsed
/// the same way the HTTP client parses it.
fn validate_dataset_url(raw: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "CCHC_DATASET_URL".to_string(),
        reason,
    };

    let url = url::Url::parse(raw).map_err(|e| invalid(format!("'{raw}' is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid(format!("'{raw}' has no host")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
