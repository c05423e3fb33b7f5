//! HTTP client for the Frappe/ERPNext REST resource API.

mod fetch_all;

use std::time::Duration;

use kcat_core::{AppConfig, AttributeDetail, Brand, CatalogItem, ErpCredentials, TemplateItem, Variant};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::ErpError;
use crate::normalize::{
    normalize_attribute, normalize_brand, normalize_catalog_item, normalize_template,
    normalize_variant,
};
use crate::rate_limit::retry_with_backoff;
use crate::types::{ErpAttribute, ErpBrand, ErpItem, FrappeDoc, FrappeList, FrappeMessage};

/// Maximum number of pages to fetch before returning an error.
/// Guards against a server that keeps returning full pages.
pub(super) const MAX_PAGES: usize = 200;

/// Fields requested for variant rows.
const VARIANT_FIELDS: &[&str] = &[
    "item_code",
    "item_name",
    "description",
    "stock_uom",
    "image",
    "standard_rate",
];

/// Fields requested for catalog listing rows.
const CATALOG_FIELDS: &[&str] = &[
    "item_code",
    "item_name",
    "brand",
    "item_group",
    "has_variants",
    "image",
    "standard_rate",
];

pub(super) struct VariantPage {
    pub(super) variants: Vec<Variant>,
    pub(super) row_count: usize,
}

/// Filters for the catalog listing. All set filters must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub brand: Option<String>,
    pub item_group: Option<String>,
}

/// Client for the ERP's resource API.
///
/// Handles 429, 404 and other non-2xx responses as typed errors and retries
/// transient failures with exponential backoff.
pub struct ErpClient {
    pub(super) client: Client,
    base_url: Url,
    /// Pre-rendered `Authorization` header value.
    authorization: Option<String>,
    pub(super) max_retries: u32,
    pub(super) backoff_base_secs: u64,
}

impl ErpClient {
    /// Creates a client for the ERP at `base_url`.
    ///
    /// # Errors
    ///
    /// - [`ErpError::InvalidBaseUrl`] if `base_url` is not an absolute http(s) URL.
    /// - [`ErpError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ErpError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            authorization: None,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from the application config, including credentials.
    ///
    /// # Errors
    ///
    /// See [`ErpClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ErpError> {
        let client = Self::new(
            &config.erp_base_url,
            config.erp_request_timeout_secs,
            &config.erp_user_agent,
            config.erp_max_retries,
            config.erp_retry_backoff_base_secs,
        )?;
        Ok(match &config.erp_credentials {
            Some(credentials) => client.with_credentials(credentials),
            None => client,
        })
    }

    /// Sends `Authorization: token {key}:{secret}` on every request.
    #[must_use]
    pub fn with_credentials(mut self, credentials: &ErpCredentials) -> Self {
        self.authorization = Some(format!(
            "token {}:{}",
            credentials.api_key, credentials.api_secret
        ));
        self
    }

    /// Fetches a template item with its ordered attribute list.
    ///
    /// # Errors
    ///
    /// - [`ErpError::NotFound`] if no item has this code.
    /// - [`ErpError::Normalization`] if the document is unusable.
    /// - Any transport error from [`Self::get_json`].
    pub async fn fetch_template(&self, item_code: &str) -> Result<TemplateItem, ErpError> {
        let url = self.endpoint(&["api", "resource", "Item", item_code])?;
        let doc: FrappeDoc<ErpItem> = self
            .get_json(url, &format!("item {item_code}"))
            .await?;
        normalize_template(doc.data)
    }

    /// Fetches a single item as a catalog row (used to validate quote additions).
    ///
    /// # Errors
    ///
    /// Same as [`Self::fetch_template`].
    pub async fn fetch_catalog_item(&self, item_code: &str) -> Result<CatalogItem, ErpError> {
        let url = self.endpoint(&["api", "resource", "Item", item_code])?;
        let doc: FrappeDoc<ErpItem> = self
            .get_json(url, &format!("item {item_code}"))
            .await?;
        normalize_catalog_item(doc.data)
    }

    /// Fetches the detail of one `Item Attribute`.
    ///
    /// # Errors
    ///
    /// - [`ErpError::NotFound`] if the attribute does not exist.
    /// - [`ErpError::Normalization`] if the document has no name.
    /// - Any transport error from [`Self::get_json`].
    pub async fn fetch_attribute_detail(&self, name: &str) -> Result<AttributeDetail, ErpError> {
        let url = self.endpoint(&["api", "resource", "Item Attribute", name])?;
        let doc: FrappeDoc<ErpAttribute> = self
            .get_json(url, &format!("item attribute {name}"))
            .await?;
        normalize_attribute(doc.data)
    }

    /// Fetches one page of a template's variants, ordered by item code.
    ///
    /// Rows that fail normalization are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Any transport error from [`Self::get_json`].
    pub async fn fetch_variants_page(
        &self,
        template_code: &str,
        start: u64,
        limit: u32,
    ) -> Result<Vec<Variant>, ErpError> {
        let page = self.variant_page(template_code, start, limit).await?;
        Ok(page.variants)
    }

    /// One raw page of variants; `row_count` counts rows before normalization.
    pub(super) async fn variant_page(
        &self,
        template_code: &str,
        start: u64,
        limit: u32,
    ) -> Result<VariantPage, ErpError> {
        let mut url = self.endpoint(&["api", "resource", "Item"])?;
        url.query_pairs_mut()
            .append_pair("fields", &json!(VARIANT_FIELDS).to_string())
            .append_pair("filters", &variant_filters(template_code))
            .append_pair("order_by", "item_code asc")
            .append_pair("limit_start", &start.to_string())
            .append_pair("limit_page_length", &limit.to_string());

        let list: FrappeList<ErpItem> = self
            .get_json(url, &format!("variants of {template_code}"))
            .await?;
        let row_count = list.data.len();

        let variants = list
            .data
            .into_iter()
            .filter_map(|row| match normalize_variant(row) {
                Ok(variant) => Some(variant),
                Err(e) => {
                    tracing::warn!(template_code, error = %e, "skipping unusable variant row");
                    None
                }
            })
            .collect();

        Ok(VariantPage {
            variants,
            row_count,
        })
    }

    /// Total number of variants the ERP holds for a template.
    ///
    /// # Errors
    ///
    /// Any transport error from [`Self::get_json`].
    pub async fn count_variants(&self, template_code: &str) -> Result<u64, ErpError> {
        let mut url = self.endpoint(&["api", "method", "frappe.client.get_count"])?;
        url.query_pairs_mut()
            .append_pair("doctype", "Item")
            .append_pair("filters", &variant_filters(template_code));
        let message: FrappeMessage<u64> = self
            .get_json(url, &format!("variant count of {template_code}"))
            .await?;
        Ok(message.message)
    }

    /// Fetches one page of the catalog listing: enabled items that are not
    /// variants, optionally narrowed by brand and item group.
    ///
    /// # Errors
    ///
    /// Any transport error from [`Self::get_json`].
    pub async fn fetch_items_page(
        &self,
        query: &ItemQuery,
        start: u64,
        limit: u32,
    ) -> Result<Vec<CatalogItem>, ErpError> {
        let mut filters = vec![
            json!(["disabled", "=", 0]),
            json!(["variant_of", "is", "not set"]),
        ];
        if let Some(brand) = &query.brand {
            filters.push(json!(["brand", "=", brand]));
        }
        if let Some(group) = &query.item_group {
            filters.push(json!(["item_group", "=", group]));
        }

        let mut url = self.endpoint(&["api", "resource", "Item"])?;
        url.query_pairs_mut()
            .append_pair("fields", &json!(CATALOG_FIELDS).to_string())
            .append_pair("filters", &json!(filters).to_string())
            .append_pair("order_by", "item_name asc")
            .append_pair("limit_start", &start.to_string())
            .append_pair("limit_page_length", &limit.to_string());

        let list: FrappeList<ErpItem> = self.get_json(url, "catalog items").await?;
        Ok(list
            .data
            .into_iter()
            .filter_map(|row| normalize_catalog_item(row).ok())
            .collect())
    }

    /// Lists all brands.
    ///
    /// # Errors
    ///
    /// Any transport error from [`Self::get_json`].
    pub async fn list_brands(&self) -> Result<Vec<Brand>, ErpError> {
        let mut url = self.endpoint(&["api", "resource", "Brand"])?;
        url.query_pairs_mut()
            .append_pair("fields", &json!(["name", "description"]).to_string())
            .append_pair("order_by", "name asc")
            .append_pair("limit_page_length", "0");
        let list: FrappeList<ErpBrand> = self.get_json(url, "brands").await?;
        Ok(list.data.into_iter().map(normalize_brand).collect())
    }

    /// GETs `url` and parses the JSON body, with retry on transient errors.
    ///
    /// # Errors
    ///
    /// - [`ErpError::RateLimited`]: HTTP 429 after all retries exhausted.
    /// - [`ErpError::NotFound`]: HTTP 404 (not retried).
    /// - [`ErpError::UnexpectedStatus`]: any other non-2xx status (5xx retried, 4xx not).
    /// - [`ErpError::Http`]: network or TLS failure after all retries exhausted.
    /// - [`ErpError::Deserialize`]: body does not match `T` (not retried).
    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> Result<T, ErpError> {
        let host = url.host_str().unwrap_or_default().to_owned();
        tracing::debug!(url = %url, "ERP request");

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let host = host.clone();
            async move {
                let mut request = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json");
                if let Some(auth) = &self.authorization {
                    request = request.header(reqwest::header::AUTHORIZATION, auth);
                }

                let response = request.send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ErpError::RateLimited {
                        host,
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ErpError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ErpError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| ErpError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ErpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ErpError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "URL cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// `[["variant_of","=",code]]`, the Frappe filter selecting a template's variants.
fn variant_filters(template_code: &str) -> String {
    json!([["variant_of", "=", template_code]]).to_string()
}

/// Parses and normalises the ERP base URL so it always ends in `/`.
fn parse_base_url(base_url: &str) -> Result<Url, ErpError> {
    let invalid = |reason: String| ErpError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason,
    };
    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme \"{}\"", url.scheme())));
    }
    Ok(url)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
