//! Positional decoding of attribute tokens from variant SKUs.
//!
//! A variant SKU is the template's own code (a fixed number of segments)
//! followed by one token per template attribute, all joined by one delimiter:
//!
//! ```text
//! A-B-C-0001-S-5
//! \________/ | |
//!  base (4)  | +-- position 2 (Weight)
//!            +---- position 1 (Size)
//! ```

use kcat_core::Variant;

/// Structural constants of the SKU format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuLayout {
    /// Segments composing the template's own code, before any attribute token.
    pub base_segments: usize,
    pub delimiter: String,
}

impl SkuLayout {
    pub fn new(base_segments: usize, delimiter: impl Into<String>) -> Self {
        Self {
            base_segments,
            delimiter: delimiter.into(),
        }
    }

    /// Token for the attribute at `position` in `sku`. See [`decode_token`].
    #[must_use]
    pub fn decode<'s>(&self, sku: &'s str, position: usize) -> &'s str {
        decode_token(sku, position, self.base_segments, &self.delimiter)
    }
}

impl Default for SkuLayout {
    fn default() -> Self {
        Self::new(4, "-")
    }
}

/// Extracts the token for the attribute at 1-based `position`.
///
/// The token lives at segment index `base_segment_count + position - 1`.
/// Returns `""` when that index is past the end of the SKU, when `position`
/// is 0, or when `delimiter` is empty. An empty token never matches a filter.
#[must_use]
pub fn decode_token<'s>(
    sku: &'s str,
    position: usize,
    base_segment_count: usize,
    delimiter: &str,
) -> &'s str {
    if delimiter.is_empty() {
        return "";
    }
    let Some(index) = position
        .checked_sub(1)
        .and_then(|offset| base_segment_count.checked_add(offset))
    else {
        return "";
    };
    sku.split(delimiter).nth(index).unwrap_or("")
}

/// Attribute tokens of a variant set, split once and reused across
/// evaluation passes.
///
/// Row `i` holds the tokens of `variants[i]`; rebuild whenever the variant
/// set changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTable {
    rows: Vec<Vec<String>>,
}

impl DecodedTable {
    #[must_use]
    pub fn build(variants: &[Variant], layout: &SkuLayout) -> Self {
        let rows = variants
            .iter()
            .map(|variant| {
                if layout.delimiter.is_empty() {
                    return Vec::new();
                }
                variant
                    .sku
                    .split(layout.delimiter.as_str())
                    .skip(layout.base_segments)
                    .map(str::to_owned)
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Same result as [`decode_token`] on the row's SKU.
    #[must_use]
    pub fn token(&self, row: usize, position: usize) -> &str {
        position
            .checked_sub(1)
            .and_then(|idx| self.rows.get(row)?.get(idx))
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
