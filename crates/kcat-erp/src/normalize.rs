//! Normalization from raw Frappe types to typed [`kcat_core`] records.
//!
//! This is the single ingress point: everything past here is typed, trimmed,
//! and free of the ERP's `""`-for-unset convention.

use kcat_core::{
    AttributeDetail, AttributeKind, AttributeValue, Brand, CatalogItem, TemplateAttribute,
    TemplateItem, Variant,
};

use crate::error::ErpError;
use crate::types::{ErpAttribute, ErpBrand, ErpItem};

/// Treats empty and whitespace-only strings as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn require_code(item_code: &str) -> Result<String, ErpError> {
    let code = item_code.trim();
    if code.is_empty() {
        return Err(ErpError::Normalization {
            item_code: "<empty>".into(),
            reason: "item has an empty item_code".into(),
        });
    }
    Ok(code.to_owned())
}

/// Normalizes a template `Item` document.
///
/// Attribute rows are ordered by `idx` when every row carries one, since SKU
/// positions follow that order.
///
/// # Errors
///
/// Returns [`ErpError::Normalization`] if the item code is empty or an
/// attribute row has no attribute name (positions after it would be wrong).
pub fn normalize_template(item: ErpItem) -> Result<TemplateItem, ErpError> {
    let item_code = require_code(&item.item_code)?;

    let mut rows = item.attributes;
    if rows.iter().all(|row| row.idx.is_some()) {
        rows.sort_by_key(|row| row.idx);
    }

    let attributes = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let name = row.attribute.trim();
            if name.is_empty() {
                return Err(ErpError::Normalization {
                    item_code: item_code.clone(),
                    reason: format!("attribute row {} has no attribute name", i + 1),
                });
            }
            Ok(TemplateAttribute::new(name))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if item.has_variants && attributes.is_empty() {
        tracing::warn!(
            item_code = %item_code,
            "template declares variants but no attributes; variants will be unfilterable"
        );
    }

    Ok(TemplateItem {
        item_name: non_empty(item.item_name).unwrap_or_else(|| item_code.clone()),
        item_code,
        description: non_empty(item.description),
        brand: non_empty(item.brand),
        item_group: non_empty(item.item_group),
        has_variants: item.has_variants,
        attributes,
        image_ref: non_empty(item.image),
    })
}

/// Normalizes a variant `Item` row. The item code is the SKU.
///
/// # Errors
///
/// Returns [`ErpError::Normalization`] if the item code is empty.
pub fn normalize_variant(item: ErpItem) -> Result<Variant, ErpError> {
    let sku = require_code(&item.item_code)?;
    Ok(Variant {
        display_name: non_empty(item.item_name).unwrap_or_else(|| sku.clone()),
        sku,
        description: non_empty(item.description),
        unit_of_measure: non_empty(item.stock_uom),
        price: item.standard_rate.filter(|p| p.is_sign_positive()),
        image_ref: non_empty(item.image),
    })
}

/// Normalizes a row of the catalog listing.
///
/// # Errors
///
/// Returns [`ErpError::Normalization`] if the item code is empty.
pub fn normalize_catalog_item(item: ErpItem) -> Result<CatalogItem, ErpError> {
    let item_code = require_code(&item.item_code)?;
    Ok(CatalogItem {
        item_name: non_empty(item.item_name).unwrap_or_else(|| item_code.clone()),
        item_code,
        brand: non_empty(item.brand),
        item_group: non_empty(item.item_group),
        has_variants: item.has_variants,
        price: item.standard_rate.filter(|p| p.is_sign_positive()),
        image_ref: non_empty(item.image),
    })
}

/// Normalizes an `Item Attribute` document.
///
/// Numeric attributes with a missing range default to `0..=0`; an increment
/// of zero or less becomes `None` (any value in range). Categorical values
/// without an abbreviation use their display value as the SKU token.
///
/// # Errors
///
/// Returns [`ErpError::Normalization`] if neither `attribute_name` nor
/// `name` is set.
pub fn normalize_attribute(attribute: ErpAttribute) -> Result<AttributeDetail, ErpError> {
    let name = non_empty(attribute.attribute_name)
        .or_else(|| non_empty(attribute.name))
        .ok_or_else(|| ErpError::Normalization {
            item_code: "<item attribute>".into(),
            reason: "item attribute has neither attribute_name nor name".into(),
        })?;

    let kind = if attribute.numeric_values {
        AttributeKind::Numeric {
            from_range: attribute.from_range.unwrap_or(0.0),
            to_range: attribute.to_range.unwrap_or(0.0),
            increment: attribute.increment.filter(|inc| *inc > 0.0),
        }
    } else {
        let values = attribute
            .item_attribute_values
            .into_iter()
            .filter_map(|row| {
                let display_value = row.attribute_value.trim().to_owned();
                if display_value.is_empty() {
                    return None;
                }
                let abbreviation =
                    non_empty(row.abbr).unwrap_or_else(|| display_value.clone());
                Some(AttributeValue {
                    display_value,
                    abbreviation,
                })
            })
            .collect();
        AttributeKind::Categorical { values }
    };

    Ok(AttributeDetail { name, kind })
}

#[must_use]
pub fn normalize_brand(brand: ErpBrand) -> Brand {
    Brand {
        name: brand.name.trim().to_owned(),
        description: non_empty(brand.description),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
