use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("KCAT_ERP_BASE_URL", "https://erp.example.com");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_fails_without_erp_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "KCAT_ERP_BASE_URL"),
        "expected MissingEnvVar(KCAT_ERP_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_base_url_without_scheme() {
    let mut map = full_env();
    map.insert("KCAT_ERP_BASE_URL", "erp.example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KCAT_ERP_BASE_URL"),
        "expected InvalidEnvVar(KCAT_ERP_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.erp_base_url, "https://erp.example.com");
    assert!(cfg.erp_credentials.is_none());
    assert_eq!(cfg.erp_request_timeout_secs, 30);
    assert_eq!(cfg.erp_user_agent, "kcat/0.1 (catalog)");
    assert_eq!(cfg.erp_max_retries, 3);
    assert_eq!(cfg.erp_retry_backoff_base_secs, 2);
    assert_eq!(cfg.erp_page_limit, 100);
    assert_eq!(cfg.sku_base_segments, 4);
    assert_eq!(cfg.sku_delimiter, "-");
    assert_eq!(cfg.catalog_page_size, 12);
    assert_eq!(cfg.quote_path.to_str(), Some("./.kcat/quote.json"));
}

#[test]
fn build_app_config_reads_credentials_pair() {
    let mut map = full_env();
    map.insert("KCAT_ERP_API_KEY", "key123");
    map.insert("KCAT_ERP_API_SECRET", "secret456");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let creds = cfg.erp_credentials.expect("credentials should be set");
    assert_eq!(creds.api_key, "key123");
    assert_eq!(creds.api_secret, "secret456");
}

#[test]
fn build_app_config_rejects_key_without_secret() {
    let mut map = full_env();
    map.insert("KCAT_ERP_API_KEY", "key123");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "KCAT_ERP_API_SECRET"),
        "expected MissingEnvVar(KCAT_ERP_API_SECRET), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_credentials() {
    let mut map = full_env();
    map.insert("KCAT_ERP_API_KEY", "key123");
    map.insert("KCAT_ERP_API_SECRET", "secret456");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret456"));
    assert!(!rendered.contains("key123"));
}

#[test]
fn sku_base_segments_override() {
    let mut map = full_env();
    map.insert("KCAT_SKU_BASE_SEGMENTS", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.sku_base_segments, 3);
}

#[test]
fn sku_base_segments_invalid() {
    let mut map = full_env();
    map.insert("KCAT_SKU_BASE_SEGMENTS", "four");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KCAT_SKU_BASE_SEGMENTS"),
        "expected InvalidEnvVar(KCAT_SKU_BASE_SEGMENTS), got: {result:?}"
    );
}

#[test]
fn empty_sku_delimiter_is_rejected() {
    let mut map = full_env();
    map.insert("KCAT_SKU_DELIMITER", "");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KCAT_SKU_DELIMITER"),
        "expected InvalidEnvVar(KCAT_SKU_DELIMITER), got: {result:?}"
    );
}

#[test]
fn zero_page_size_is_rejected() {
    let mut map = full_env();
    map.insert("KCAT_CATALOG_PAGE_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KCAT_CATALOG_PAGE_SIZE"),
        "expected InvalidEnvVar(KCAT_CATALOG_PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn zero_erp_page_limit_is_rejected() {
    let mut map = full_env();
    map.insert("KCAT_ERP_PAGE_LIMIT", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KCAT_ERP_PAGE_LIMIT"),
        "expected InvalidEnvVar(KCAT_ERP_PAGE_LIMIT), got: {result:?}"
    );
}

#[test]
fn max_retries_override_and_invalid() {
    let mut map = full_env();
    map.insert("KCAT_ERP_MAX_RETRIES", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.erp_max_retries, 5);

    map.insert("KCAT_ERP_MAX_RETRIES", "many");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KCAT_ERP_MAX_RETRIES"),
        "expected InvalidEnvVar(KCAT_ERP_MAX_RETRIES), got: {result:?}"
    );
}
