pub mod app_config;
pub mod catalog;
pub mod config;
pub mod quote;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, ErpCredentials};
pub use catalog::{
    AttributeDetail, AttributeKind, AttributeSchema, AttributeValue, Brand, CatalogItem,
    TemplateAttribute, TemplateItem, Variant,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use quote::{QuoteCart, QuoteLine, QuoteState, QuoteStore, Wishlist};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid quantity {quantity} for {item_code}: quantity must be at least 1")]
    InvalidQuantity { item_code: String, quantity: u32 },

    #[error("item {0} is not in the quote cart")]
    NotInCart(String),

    #[error("quote store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("quote store at {path} is not valid JSON: {source}")]
    Serde {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
