//! Frappe/ERPNext REST response types.
//!
//! ## Observed shape of Frappe resource responses
//!
//! ### Envelopes
//! `GET /api/resource/{doctype}/{name}` wraps the document in `{"data": {...}}`;
//! the list form `GET /api/resource/{doctype}` returns `{"data": [...]}`.
//! Whitelisted methods (`/api/method/...`) return `{"message": ...}`.
//!
//! ### Check fields
//! Frappe "Check" fields (`has_variants`, `numeric_values`, `disabled`) are
//! serialized as the integers `0`/`1`, not JSON booleans. Some proxies and
//! older sites send them as strings. [`deserialize_flag`] accepts all of these
//! and treats `null`/absent as `false`.
//!
//! ### Float fields
//! `from_range`, `to_range`, `increment` and `standard_rate` are usually JSON
//! numbers but may arrive as numeric strings or `null`. `increment` of `0`
//! means the range is free-form.
//!
//! ### Empty strings
//! Unset Data/Link fields are often `""` rather than `null`; normalization
//! turns them into `None`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `{"data": T}` envelope of single-document resource responses.
#[derive(Debug, Deserialize)]
pub struct FrappeDoc<T> {
    pub data: T,
}

/// `{"data": [T]}` envelope of resource list responses.
#[derive(Debug, Deserialize)]
pub struct FrappeList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// `{"message": T}` envelope of whitelisted method responses.
#[derive(Debug, Deserialize)]
pub struct FrappeMessage<T> {
    pub message: T,
}

/// An `Item` document, either a template, a variant, or a plain item.
#[derive(Debug, Deserialize)]
pub struct ErpItem {
    /// Item code; for variants this is the full SKU (e.g. `"A-B-C-0001-S-5"`).
    pub item_code: String,

    #[serde(default)]
    pub item_name: Option<String>,

    /// Rich-text description. May contain HTML.
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub item_group: Option<String>,

    /// `1` for template items.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub has_variants: bool,

    /// Template item code for variants; empty or absent otherwise.
    #[serde(default)]
    pub variant_of: Option<String>,

    #[serde(default)]
    pub stock_uom: Option<String>,

    /// Site-relative file URL, e.g. `"/files/range-6b.jpg"`.
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub standard_rate: Option<Decimal>,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub disabled: bool,

    /// Template attribute rows, ordered by `idx`. Only present on the
    /// single-document endpoint.
    #[serde(default)]
    pub attributes: Vec<ErpItemAttribute>,
}

/// A row of the `Item Variant Attribute` child table.
#[derive(Debug, Deserialize)]
pub struct ErpItemAttribute {
    pub attribute: String,

    /// Row order within the parent item. Rows are expected pre-sorted, but
    /// when present this is used to restore order.
    #[serde(default)]
    pub idx: Option<u32>,

    /// Set on variant rows; empty on template rows.
    #[serde(default)]
    pub attribute_value: Option<String>,
}

/// An `Item Attribute` document.
#[derive(Debug, Deserialize)]
pub struct ErpAttribute {
    /// Document name; equal to `attribute_name` on standard sites.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub attribute_name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub numeric_values: bool,

    #[serde(default, deserialize_with = "deserialize_float")]
    pub from_range: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_float")]
    pub to_range: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_float")]
    pub increment: Option<f64>,

    #[serde(default)]
    pub item_attribute_values: Vec<ErpAttributeValue>,
}

/// A row of the `Item Attribute Value` child table.
#[derive(Debug, Deserialize)]
pub struct ErpAttributeValue {
    pub attribute_value: String,

    /// SKU abbreviation. Falls back to `attribute_value` when empty.
    #[serde(default)]
    pub abbr: Option<String>,
}

/// A `Brand` document.
#[derive(Debug, Deserialize)]
pub struct ErpBrand {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Accepts `true`/`false`, `0`/`1`, `"0"`/`"1"`/`"true"`/`"false"`, or `null`.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "True" | "yes"),
        _ => false,
    })
}

/// Accepts a JSON number or a numeric string; anything else is `None`.
pub(crate) fn deserialize_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|x| x.is_finite()))
}

/// Accepts a JSON number or a decimal string; anything else is `None`.
pub(crate) fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.to_string().parse::<Decimal>().ok().or_else(|| {
            n.as_f64().and_then(|x| Decimal::try_from(x).ok())
        }),
        Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    })
}
