use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// ERP API credentials, sent as `Authorization: token {key}:{secret}`.
#[derive(Clone, PartialEq, Eq)]
pub struct ErpCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for ErpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub erp_base_url: String,
    pub erp_credentials: Option<ErpCredentials>,
    pub erp_request_timeout_secs: u64,
    pub erp_user_agent: String,
    pub erp_max_retries: u32,
    pub erp_retry_backoff_base_secs: u64,
    /// Variants requested per `limit_page_length` page.
    pub erp_page_limit: u32,
    /// Number of SKU segments that make up the template's own code.
    pub sku_base_segments: usize,
    pub sku_delimiter: String,
    pub catalog_page_size: usize,
    pub quote_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("erp_base_url", &self.erp_base_url)
            .field(
                "erp_credentials",
                &self.erp_credentials.as_ref().map(|_| "[redacted]"),
            )
            .field("erp_request_timeout_secs", &self.erp_request_timeout_secs)
            .field("erp_user_agent", &self.erp_user_agent)
            .field("erp_max_retries", &self.erp_max_retries)
            .field(
                "erp_retry_backoff_base_secs",
                &self.erp_retry_backoff_base_secs,
            )
            .field("erp_page_limit", &self.erp_page_limit)
            .field("sku_base_segments", &self.sku_base_segments)
            .field("sku_delimiter", &self.sku_delimiter)
            .field("catalog_page_size", &self.catalog_page_size)
            .field("quote_path", &self.quote_path)
            .finish()
    }
}
