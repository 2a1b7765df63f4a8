use crate::app_config::{AppConfig, Environment};
use crate::error::ConfigError;

/// Load pipeline configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env
/// vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse. All variables have
/// defaults, so a bare environment is valid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load pipeline configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration through the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

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

    let env = parse_environment(&or_default("PRICEWATCH_ENV", "development"))?;
    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "PRICEWATCH_SOURCES_PATH",
        "./config/sources.yaml",
    ));

    let chromium_binary = lookup("PRICEWATCH_CHROMIUM_PATH").ok().map(PathBuf::from);
    let webdriver_url = lookup("PRICEWATCH_WEBDRIVER_URL").ok();

    let navigation_timeout_secs = parse_u64("PRICEWATCH_NAVIGATION_TIMEOUT_SECS", "30")?;
    let navigation_max_retries = parse_u32("PRICEWATCH_NAVIGATION_MAX_RETRIES", "3")?;
    let navigation_backoff_base_ms = parse_u64("PRICEWATCH_NAVIGATION_BACKOFF_BASE_MS", "1000")?;

    let scrape_delay_ms = parse_u64("PRICEWATCH_SCRAPE_DELAY_MS", "1200")?;
    let batch_size = parse_usize("PRICEWATCH_BATCH_SIZE", "10")?;
    let delay_between_batches_ms = parse_u64("PRICEWATCH_BATCH_DELAY_MS", "2000")?;

    let rate_cache_ttl_secs = parse_u64("PRICEWATCH_RATE_CACHE_TTL_SECS", "86400")?;
    let rate_update_delay_ms = parse_u64("PRICEWATCH_RATE_UPDATE_DELAY_MS", "1000")?;

    Ok(AppConfig {
        env,
        log_level,
        sources_path,
        chromium_binary,
        webdriver_url,
        navigation_timeout_secs,
        navigation_max_retries,
        navigation_backoff_base_ms,
        scrape_delay_ms,
        batch_size,
        delay_between_batches_ms,
        rate_cache_ttl_secs,
        rate_update_delay_ms,
    })
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
