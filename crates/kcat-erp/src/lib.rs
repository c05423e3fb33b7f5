pub mod cache;
pub mod client;
pub mod error;
pub mod loader;
pub mod normalize;
pub(crate) mod rate_limit;
pub mod types;

pub use cache::AttributeCache;
pub use client::{ErpClient, ItemQuery};
pub use error::ErpError;
pub use loader::{LoadReport, TemplateLoader};
