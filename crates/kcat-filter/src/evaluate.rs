//! Filter-match evaluation over decoded SKU tokens.
//!
//! Evaluation never fails: every malformed input degrades to a defined
//! pass/fail [`MatchOutcome`].

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use kcat_core::{AttributeKind, AttributeSchema, Variant};
use serde::{Deserialize, Serialize};

use crate::decode::{DecodedTable, SkuLayout};

/// The desired value of one attribute filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

/// User input should be kept as [`FilterValue::Text`]: numeric attributes
/// coerce it with [`FilterValue::as_number`], categorical attributes compare
/// the exact text, so `"1.50"` and `"02"` stay distinct from `1.5` and `2`.
impl FilterValue {
    /// Numeric coercion used against numeric attributes.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => Some(*n),
            FilterValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Text form used against categorical attributes.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FilterValue::Number(n) => Cow::Owned(n.to_string()),
            FilterValue::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Number(n)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

/// Attribute name → desired value. An attribute with no entry is unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    entries: BTreeMap<String, FilterValue>,
}

impl FilterSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Self::set`].
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.set(attribute, value);
        self
    }

    /// Returns the previous value for the attribute, if any.
    pub fn set(
        &mut self,
        attribute: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Option<FilterValue> {
        self.entries.insert(attribute.into(), value.into())
    }

    pub fn clear(&mut self, attribute: &str) -> Option<FilterValue> {
        self.entries.remove(attribute)
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&FilterValue> {
        self.entries.get(attribute)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// How a single filter entry resolved against a single variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Decoded token equals the expected value.
    Matched,
    /// No abbreviation is known for the selected display value, and the raw
    /// token equals the display value itself.
    MatchedRawFallback,
    /// The attribute's detail has not arrived; the filter is inert.
    SchemaUnavailable,
    /// The SKU has no segment at the attribute's position.
    MalformedSku,
    /// Numeric attribute whose token, or selected value, is not a number.
    UnparseableNumeric,
    /// No abbreviation is known and the raw token differs from the display value.
    UnmatchedCategorical,
    Mismatch,
}

impl MatchOutcome {
    #[must_use]
    pub fn passes(self) -> bool {
        matches!(
            self,
            MatchOutcome::Matched
                | MatchOutcome::MatchedRawFallback
                | MatchOutcome::SchemaUnavailable
        )
    }
}

/// Resolves one filter entry against one decoded token.
///
/// `schema` is `None` while the attribute's detail is still loading.
#[must_use]
pub fn evaluate_filter(
    token: &str,
    desired: &FilterValue,
    schema: Option<&AttributeSchema>,
) -> MatchOutcome {
    let Some(schema) = schema else {
        return MatchOutcome::SchemaUnavailable;
    };
    if token.is_empty() {
        return MatchOutcome::MalformedSku;
    }

    match &schema.kind {
        AttributeKind::Numeric { .. } => {
            let (Ok(actual), Some(expected)) = (token.trim().parse::<f64>(), desired.as_number())
            else {
                return MatchOutcome::UnparseableNumeric;
            };
            // Exact equality: tokens are written from the same stepped range.
            #[allow(clippy::float_cmp)]
            let equal = actual == expected;
            if equal {
                MatchOutcome::Matched
            } else {
                MatchOutcome::Mismatch
            }
        }
        kind @ AttributeKind::Categorical { .. } => {
            let display = desired.as_text();
            match kind.abbreviation_for(&display) {
                Some(abbr) if abbr == token => MatchOutcome::Matched,
                Some(_) => MatchOutcome::Mismatch,
                None if token == display => MatchOutcome::MatchedRawFallback,
                None => MatchOutcome::UnmatchedCategorical,
            }
        }
    }
}

/// `true` when every active filter passes for the variant whose tokens are
/// produced by `token_at(position)`.
fn variant_passes<'t>(
    token_at: impl Fn(usize) -> &'t str,
    filters: &FilterSelection,
    schemas: &HashMap<String, AttributeSchema>,
) -> bool {
    filters.iter().all(|(attribute, desired)| {
        let schema = schemas.get(attribute);
        let token = schema.map_or("", |s| token_at(s.position));
        evaluate_filter(token, desired, schema).passes()
    })
}

/// Variants satisfying every active filter, in their original order.
///
/// Decodes SKUs on the fly; prefer [`filter_decoded`] when the same variant
/// set is filtered repeatedly.
#[must_use]
pub fn filter_variants<'v>(
    variants: &'v [Variant],
    filters: &FilterSelection,
    schemas: &HashMap<String, AttributeSchema>,
    layout: &SkuLayout,
) -> Vec<&'v Variant> {
    variants
        .iter()
        .filter(|variant| variant_passes(|pos| layout.decode(&variant.sku, pos), filters, schemas))
        .collect()
}

/// Same as [`filter_variants`], reading tokens from a table built from
/// `variants` with [`DecodedTable::build`].
#[must_use]
pub fn filter_decoded<'v>(
    variants: &'v [Variant],
    table: &DecodedTable,
    filters: &FilterSelection,
    schemas: &HashMap<String, AttributeSchema>,
) -> Vec<&'v Variant> {
    variants
        .iter()
        .enumerate()
        .filter(|(row, _)| variant_passes(|pos| table.token(*row, pos), filters, schemas))
        .map(|(_, variant)| variant)
        .collect()
}

#[cfg(test)]
mod tests {
    use kcat_core::AttributeValue;

    use super::*;

    fn numeric(position: usize) -> AttributeSchema {
        AttributeSchema {
            name: "Weight".to_string(),
            position,
            kind: AttributeKind::Numeric {
                from_range: 0.0,
                to_range: 10.0,
                increment: Some(1.0),
            },
        }
    }

    fn size(position: usize) -> AttributeSchema {
        AttributeSchema {
            name: "Size".to_string(),
            position,
            kind: AttributeKind::Categorical {
                values: vec![
                    AttributeValue::new("Small", "S"),
                    AttributeValue::new("Large", "L"),
                ],
            },
        }
    }

    fn gauge(position: usize) -> AttributeSchema {
        AttributeSchema {
            name: "Gauge".to_string(),
            position,
            kind: AttributeKind::Categorical {
                values: vec![
                    AttributeValue::new("1.50", "15"),
                    AttributeValue::new("02", "2G"),
                ],
            },
        }
    }

    #[test]
    fn text_coerces_to_number() {
        assert_eq!(FilterValue::from(" 2.5 ").as_number(), Some(2.5));
        assert_eq!(FilterValue::from("0").as_number(), Some(0.0));
        assert_eq!(FilterValue::from("Large").as_number(), None);
    }

    #[test]
    fn categorical_numeric_looking_display_value_keeps_its_text() {
        let schema = gauge(1);
        assert_eq!(
            evaluate_filter("15", &FilterValue::from("1.50"), Some(&schema)),
            MatchOutcome::Matched
        );
        assert_eq!(
            evaluate_filter("2G", &FilterValue::from("02"), Some(&schema)),
            MatchOutcome::Matched
        );
        assert_eq!(
            evaluate_filter("15", &FilterValue::from("1.5"), Some(&schema)),
            MatchOutcome::UnmatchedCategorical
        );
    }

    #[test]
    fn numeric_text_matches_numeric_token() {
        let outcome = evaluate_filter("0", &FilterValue::from("0"), Some(&numeric(1)));
        assert_eq!(outcome, MatchOutcome::Matched);
    }

    #[test]
    fn number_renders_without_trailing_zero() {
        assert_eq!(FilterValue::Number(10.0).as_text(), "10");
        assert_eq!(FilterValue::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn missing_schema_is_inert() {
        let outcome = evaluate_filter("", &FilterValue::Number(3.0), None);
        assert_eq!(outcome, MatchOutcome::SchemaUnavailable);
        assert!(outcome.passes());
    }

    #[test]
    fn empty_token_never_matches() {
        let outcome = evaluate_filter("", &FilterValue::Number(0.0), Some(&numeric(1)));
        assert_eq!(outcome, MatchOutcome::MalformedSku);
        assert!(!outcome.passes());
    }

    #[test]
    fn numeric_zero_matches_zero_token() {
        let outcome = evaluate_filter("0", &FilterValue::Number(0.0), Some(&numeric(1)));
        assert_eq!(outcome, MatchOutcome::Matched);
    }

    #[test]
    fn numeric_compares_by_value_not_text() {
        let outcome = evaluate_filter("3.0", &FilterValue::Text("3".into()), Some(&numeric(1)));
        assert_eq!(outcome, MatchOutcome::Matched);
    }

    #[test]
    fn numeric_unparseable_token() {
        let outcome = evaluate_filter("XL", &FilterValue::Number(3.0), Some(&numeric(1)));
        assert_eq!(outcome, MatchOutcome::UnparseableNumeric);
        assert!(!outcome.passes());
    }

    #[test]
    fn numeric_nan_token_never_matches() {
        let outcome = evaluate_filter("NaN", &FilterValue::Number(f64::NAN), Some(&numeric(1)));
        assert_eq!(outcome, MatchOutcome::Mismatch);
    }

    #[test]
    fn categorical_compares_against_abbreviation() {
        let desired = FilterValue::from("Large");
        assert_eq!(evaluate_filter("L", &desired, Some(&size(1))), MatchOutcome::Matched);
        assert_eq!(evaluate_filter("S", &desired, Some(&size(1))), MatchOutcome::Mismatch);
        // The display string itself is not what SKUs carry.
        assert_eq!(
            evaluate_filter("Large", &desired, Some(&size(1))),
            MatchOutcome::Mismatch
        );
    }

    #[test]
    fn categorical_falls_back_to_raw_comparison() {
        let desired = FilterValue::from("Medium");
        assert_eq!(
            evaluate_filter("Medium", &desired, Some(&size(1))),
            MatchOutcome::MatchedRawFallback
        );
        assert_eq!(
            evaluate_filter("M", &desired, Some(&size(1))),
            MatchOutcome::UnmatchedCategorical
        );
    }

    #[test]
    fn selection_set_returns_previous_and_clear_removes() {
        let mut selection = FilterSelection::new();
        assert!(selection.set("Weight", 0.0).is_none());
        assert_eq!(selection.set("Weight", 3.0), Some(FilterValue::Number(0.0)));
        assert_eq!(selection.get("Weight"), Some(&FilterValue::Number(3.0)));
        assert!(selection.clear("Weight").is_some());
        assert!(selection.is_empty());
    }

    #[test]
    fn filter_decoded_agrees_with_filter_variants() {
        let variants: Vec<Variant> = ["A-B-C-0001-S-5", "A-B-C-0001-L-3", "A-B-C-0001-S"]
            .iter()
            .map(|sku| Variant {
                sku: (*sku).to_string(),
                display_name: (*sku).to_string(),
                description: None,
                unit_of_measure: None,
                price: None,
                image_ref: None,
            })
            .collect();
        let schemas: HashMap<String, AttributeSchema> = [
            ("Size".to_string(), size(1)),
            ("Weight".to_string(), numeric(2)),
        ]
        .into_iter()
        .collect();
        let layout = SkuLayout::default();
        let table = DecodedTable::build(&variants, &layout);

        for filters in [
            FilterSelection::new(),
            FilterSelection::new().with("Size", "Small"),
            FilterSelection::new().with("Weight", 3.0),
            FilterSelection::new().with("Size", "Small").with("Weight", 5.0),
        ] {
            assert_eq!(
                filter_variants(&variants, &filters, &schemas, &layout),
                filter_decoded(&variants, &table, &filters, &schemas),
                "filters: {filters:?}"
            );
        }
    }
}
