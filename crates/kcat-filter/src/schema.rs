//! Attribute position resolution for a template item.

use std::collections::HashMap;

use kcat_core::{AttributeDetail, AttributeSchema, TemplateAttribute};

/// Attribute names in SKU-encoding order. Position is `index + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributePositions {
    order: Vec<String>,
}

impl AttributePositions {
    /// 1-based position of `name`, or `None` if the template does not declare it.
    ///
    /// A name listed twice resolves to its first occurrence.
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|n| n == name).map(|idx| idx + 1)
    }

    /// `(name, position)` pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), idx + 1))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pairs every available detail with its position.
    ///
    /// Attributes with no detail yet are left out; the evaluator treats
    /// filters on them as inert.
    pub fn bind<'d>(
        &self,
        detail_for: impl Fn(&str) -> Option<&'d AttributeDetail>,
    ) -> HashMap<String, AttributeSchema> {
        self.iter()
            .filter_map(|(name, position)| {
                let detail = detail_for(name)?;
                Some((
                    name.to_owned(),
                    AttributeSchema::from_detail(detail.clone(), position),
                ))
            })
            .collect()
    }
}

/// Assigns `position = index + 1` to each declared template attribute.
///
/// An empty list yields an empty mapping, which leaves every variant unfiltered.
#[must_use]
pub fn resolve_schema(template_attributes: &[TemplateAttribute]) -> AttributePositions {
    AttributePositions {
        order: template_attributes
            .iter()
            .map(|a| a.attribute.clone())
            .collect(),
    }
}
