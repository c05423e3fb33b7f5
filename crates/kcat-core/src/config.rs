use crate::app_config::{AppConfig, Environment, ErpCredentials};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let erp_base_url = require("KCAT_ERP_BASE_URL")?;
    if !(erp_base_url.starts_with("http://") || erp_base_url.starts_with("https://")) {
        return Err(invalid(
            "KCAT_ERP_BASE_URL",
            format!("\"{erp_base_url}\" must start with http:// or https://"),
        ));
    }

    let erp_credentials = match (
        lookup("KCAT_ERP_API_KEY").ok(),
        lookup("KCAT_ERP_API_SECRET").ok(),
    ) {
        (Some(api_key), Some(api_secret)) => Some(ErpCredentials {
            api_key,
            api_secret,
        }),
        (None, None) => None,
        (Some(_), None) => return Err(ConfigError::MissingEnvVar("KCAT_ERP_API_SECRET".into())),
        (None, Some(_)) => return Err(ConfigError::MissingEnvVar("KCAT_ERP_API_KEY".into())),
    };

    let env = parse_environment(&or_default("KCAT_ENV", "development"));
    let log_level = or_default("KCAT_LOG_LEVEL", "info");

    let erp_request_timeout_secs = parse_u64("KCAT_ERP_REQUEST_TIMEOUT_SECS", "30")?;
    let erp_user_agent = or_default("KCAT_ERP_USER_AGENT", "kcat/0.1 (catalog)");
    let erp_max_retries = parse_u32("KCAT_ERP_MAX_RETRIES", "3")?;
    let erp_retry_backoff_base_secs = parse_u64("KCAT_ERP_RETRY_BACKOFF_BASE_SECS", "2")?;
    let erp_page_limit = parse_u32("KCAT_ERP_PAGE_LIMIT", "100")?;
    if erp_page_limit == 0 {
        return Err(invalid("KCAT_ERP_PAGE_LIMIT", "must be at least 1".into()));
    }

    let sku_base_segments = parse_usize("KCAT_SKU_BASE_SEGMENTS", "4")?;
    let sku_delimiter = or_default("KCAT_SKU_DELIMITER", "-");
    if sku_delimiter.is_empty() {
        return Err(invalid("KCAT_SKU_DELIMITER", "must not be empty".into()));
    }

    let catalog_page_size = parse_usize("KCAT_CATALOG_PAGE_SIZE", "12")?;
    if catalog_page_size == 0 {
        return Err(invalid("KCAT_CATALOG_PAGE_SIZE", "must be at least 1".into()));
    }

    let quote_path = PathBuf::from(or_default("KCAT_QUOTE_PATH", "./.kcat/quote.json"));

    Ok(AppConfig {
        env,
        log_level,
        erp_base_url,
        erp_credentials,
        erp_request_timeout_secs,
        erp_user_agent,
        erp_max_retries,
        erp_retry_backoff_base_secs,
        erp_page_limit,
        sku_base_segments,
        sku_delimiter,
        catalog_page_size,
        quote_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
