use thiserror::Error;

#[derive(Debug, Error)]
pub enum ErpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {host} (retry after {retry_after_secs}s)")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("normalization error for {item_code}: {reason}")]
    Normalization { item_code: String, reason: String },

    #[error("pagination limit reached for {template}: exceeded {max_pages} pages")]
    PaginationLimit { template: String, max_pages: usize },

    #[error("invalid ERP base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
