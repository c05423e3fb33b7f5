//! Typed catalog records shared by the ERP client, the filter engine and the CLI.
//!
//! Everything in here is already coerced from the ERP's loose JSON (0/1
//! booleans, numeric strings, empty strings for "unset"). Nothing downstream
//! of `kcat-erp::normalize` ever sees raw remote JSON.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of choices [`AttributeKind::numeric_choices`]
/// will enumerate for a single numeric range.
const MAX_NUMERIC_CHOICES: usize = 1_000;

/// One entry of a template item's declared attribute list, in SKU-encoding order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAttribute {
    pub attribute: String,
}

impl TemplateAttribute {
    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }
}

/// A parameterized product definition. Not directly purchasable; owns variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub item_code: String,
    pub item_name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub item_group: Option<String>,
    pub has_variants: bool,
    /// Ordered as the attribute tokens appear in variant SKUs.
    pub attributes: Vec<TemplateAttribute>,
    pub image_ref: Option<String>,
}

/// A row of the paginated catalog listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_code: String,
    pub item_name: String,
    pub brand: Option<String>,
    pub item_group: Option<String>,
    pub has_variants: bool,
    pub price: Option<Decimal>,
    pub image_ref: Option<String>,
}

/// A concrete, purchasable item belonging to exactly one template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Base code segments followed by one token per template attribute.
    pub sku: String,
    pub display_name: String,
    pub description: Option<String>,
    pub unit_of_measure: Option<String>,
    /// `None` or zero means "price on request".
    pub price: Option<Decimal>,
    pub image_ref: Option<String>,
}

impl Variant {
    /// Returns `true` when no usable list price exists for this variant.
    #[must_use]
    pub fn is_price_on_request(&self) -> bool {
        self.price.is_none_or(|p| p.is_zero())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    pub description: Option<String>,
}

/// A categorical choice: the label shown to users and the token used in SKUs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub display_value: String,
    pub abbreviation: String,
}

impl AttributeValue {
    pub fn new(display_value: impl Into<String>, abbreviation: impl Into<String>) -> Self {
        Self {
            display_value: display_value.into(),
            abbreviation: abbreviation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeKind {
    Numeric {
        from_range: f64,
        to_range: f64,
        /// `None` means any value in range is legal.
        increment: Option<f64>,
    },
    Categorical {
        values: Vec<AttributeValue>,
    },
}

impl AttributeKind {
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeKind::Numeric { .. })
    }

    /// Looks up the SKU abbreviation for a categorical display value.
    ///
    /// Always `None` for numeric attributes.
    #[must_use]
    pub fn abbreviation_for(&self, display_value: &str) -> Option<&str> {
        match self {
            AttributeKind::Categorical { values } => values
                .iter()
                .find(|v| v.display_value == display_value)
                .map(|v| v.abbreviation.as_str()),
            AttributeKind::Numeric { .. } => None,
        }
    }

    /// Enumerates the selectable values of a stepped numeric range.
    ///
    /// Returns `None` for categorical attributes and for numeric ranges with
    /// no positive increment (free-form input), or when the range would
    /// produce more than [`MAX_NUMERIC_CHOICES`] entries.
    #[must_use]
    pub fn numeric_choices(&self) -> Option<Vec<f64>> {
        let AttributeKind::Numeric {
            from_range,
            to_range,
            increment: Some(step),
        } = *self
        else {
            return None;
        };
        if step.is_nan() || step <= 0.0 {
            return None;
        }
        if !from_range.is_finite() || !to_range.is_finite() || to_range < from_range {
            return None;
        }

        // Tolerance keeps 0.1-style steps from dropping the last value.
        let steps = ((to_range - from_range) / step + 1e-9).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = steps as usize + 1;
        if count > MAX_NUMERIC_CHOICES {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let choices = (0..count)
            .map(|i| ((from_range + i as f64 * step) * 1e6).round() / 1e6)
            .collect();
        Some(choices)
    }
}

/// The position-independent description of an attribute, as returned by the
/// ERP and stored in the per-session attribute cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDetail {
    pub name: String,
    pub kind: AttributeKind,
}

/// An attribute as it participates in one template's SKU encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    pub name: String,
    /// 1-based ordinal within the template's attribute list.
    pub position: usize,
    pub kind: AttributeKind,
}

impl AttributeSchema {
    #[must_use]
    pub fn from_detail(detail: AttributeDetail, position: usize) -> Self {
        Self {
            name: detail.name,
            position,
            kind: detail.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_kind() -> AttributeKind {
        AttributeKind::Categorical {
            values: vec![
                AttributeValue::new("Small", "S"),
                AttributeValue::new("Large", "L"),
            ],
        }
    }

    fn make_variant(price: Option<Decimal>) -> Variant {
        Variant {
            sku: "A-B-C-0001-S-5".to_string(),
            display_name: "Prep Table Small 5kg".to_string(),
            description: None,
            unit_of_measure: Some("Nos".to_string()),
            price,
            image_ref: None,
        }
    }

    #[test]
    fn abbreviation_for_known_display_value() {
        assert_eq!(size_kind().abbreviation_for("Large"), Some("L"));
    }

    #[test]
    fn abbreviation_for_unknown_display_value_is_none() {
        assert_eq!(size_kind().abbreviation_for("Medium"), None);
    }

    #[test]
    fn abbreviation_for_numeric_is_none() {
        let kind = AttributeKind::Numeric {
            from_range: 1.0,
            to_range: 10.0,
            increment: Some(1.0),
        };
        assert_eq!(kind.abbreviation_for("1"), None);
        assert!(kind.is_numeric());
    }

    #[test]
    fn numeric_choices_enumerates_stepped_range() {
        let kind = AttributeKind::Numeric {
            from_range: 1.0,
            to_range: 2.0,
            increment: Some(0.25),
        };
        assert_eq!(
            kind.numeric_choices(),
            Some(vec![1.0, 1.25, 1.5, 1.75, 2.0])
        );
    }

    #[test]
    fn numeric_choices_keeps_last_value_for_fractional_step() {
        let kind = AttributeKind::Numeric {
            from_range: 0.0,
            to_range: 0.3,
            increment: Some(0.1),
        };
        assert_eq!(kind.numeric_choices(), Some(vec![0.0, 0.1, 0.2, 0.3]));
    }

    #[test]
    fn numeric_choices_none_without_increment() {
        let kind = AttributeKind::Numeric {
            from_range: 0.0,
            to_range: 10.0,
            increment: None,
        };
        assert!(kind.numeric_choices().is_none());
        assert!(size_kind().numeric_choices().is_none());
    }

    #[test]
    fn numeric_choices_none_for_inverted_range() {
        let kind = AttributeKind::Numeric {
            from_range: 10.0,
            to_range: 1.0,
            increment: Some(1.0),
        };
        assert!(kind.numeric_choices().is_none());
    }

    #[test]
    fn price_on_request_when_absent_or_zero() {
        assert!(make_variant(None).is_price_on_request());
        assert!(make_variant(Some(Decimal::ZERO)).is_price_on_request());
        assert!(!make_variant(Some(Decimal::new(129_900, 2))).is_price_on_request());
    }

    #[test]
    fn schema_from_detail_keeps_kind() {
        let detail = AttributeDetail {
            name: "Size".to_string(),
            kind: size_kind(),
        };
        let schema = AttributeSchema::from_detail(detail, 2);
        assert_eq!(schema.name, "Size");
        assert_eq!(schema.position, 2);
        assert_eq!(schema.kind, size_kind());
    }

    #[test]
    fn attribute_kind_serializes_with_tag() {
        let json = serde_json::to_value(size_kind()).unwrap();
        assert_eq!(json["kind"], "categorical");
        assert_eq!(json["values"][0]["abbreviation"], "S");
    }
}
