//! Loads a template, its variants and its attribute details into a
//! [`SessionHandle`].
//!
//! The template document is fetched first because it names the attributes.
//! Variants and attribute details are then fetched concurrently; each
//! attribute detail is applied as soon as it arrives. Every write carries the
//! generation returned by `begin_template`, so a load that is overtaken by a
//! newer `open` never touches the newer template's state.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use kcat_filter::{Generation, SessionHandle};

use crate::cache::AttributeCache;
use crate::client::ErpClient;
use crate::error::ErpError;

/// Outcome of one [`TemplateLoader::open`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub generation: Generation,
    pub variant_count: usize,
    pub attributes_ready: usize,
    /// Attributes whose detail could not be fetched. Filters on these are inert.
    pub attributes_unavailable: Vec<String>,
    /// A newer template was opened before this load finished; some or all of
    /// the fetched data was discarded.
    pub superseded: bool,
}

#[derive(Clone)]
pub struct TemplateLoader {
    client: Arc<ErpClient>,
    cache: Arc<AttributeCache>,
    page_limit: u32,
}

impl TemplateLoader {
    #[must_use]
    pub fn new(client: Arc<ErpClient>, cache: Arc<AttributeCache>, page_limit: u32) -> Self {
        Self {
            client,
            cache,
            page_limit,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &AttributeCache {
        &self.cache
    }

    /// Opens `item_code` in `session`, replacing whatever template it held.
    ///
    /// Attribute fetch failures are recorded as
    /// [`kcat_filter::AttributeState::Unavailable`] and listed in the report;
    /// they do not fail the load.
    ///
    /// # Errors
    ///
    /// Returns the fetch error if the template or its variants cannot be
    /// loaded. The failure is also recorded in the session as
    /// [`kcat_filter::LoadState::Failed`].
    pub async fn open(&self, session: &SessionHandle, item_code: &str) -> Result<LoadReport, ErpError> {
        let generation = session.update(|s| s.begin_template(item_code));
        tracing::info!(item_code, ?generation, "loading template");

        let template = match self.client.fetch_template(item_code).await {
            Ok(template) => template,
            Err(e) => {
                tracing::error!(item_code, error = %e, "template fetch failed");
                let reason = e.to_string();
                session.update(|s| {
                    s.mark_template_failed(generation, reason.clone());
                    s.mark_variants_failed(generation, reason);
                });
                return Err(e);
            }
        };

        let mut report = LoadReport {
            generation,
            variant_count: 0,
            attributes_ready: 0,
            attributes_unavailable: Vec::new(),
            superseded: false,
        };

        if !session.update(|s| s.apply_template(generation, &template.attributes)) {
            report.superseded = true;
            return Ok(report);
        }

        let names: Vec<String> = template
            .attributes
            .iter()
            .map(|a| a.attribute.clone())
            .collect();

        let variants = self.load_variants(session, generation, item_code);
        let attributes = self.load_attributes(session, generation, &names, &mut report);
        let (variants, ()) = tokio::join!(variants, attributes);

        match variants {
            Ok(Some(count)) => report.variant_count = count,
            Ok(None) => report.superseded = true,
            Err(e) => return Err(e),
        }

        tracing::info!(
            item_code,
            variants = report.variant_count,
            attributes_ready = report.attributes_ready,
            attributes_unavailable = report.attributes_unavailable.len(),
            superseded = report.superseded,
            "template loaded"
        );
        Ok(report)
    }

    /// Returns `Ok(None)` when the variants arrived for a stale generation.
    async fn load_variants(
        &self,
        session: &SessionHandle,
        generation: Generation,
        item_code: &str,
    ) -> Result<Option<usize>, ErpError> {
        match self.client.fetch_all_variants(item_code, self.page_limit).await {
            Ok(variants) => {
                let count = variants.len();
                let applied = session.update(|s| s.apply_variants(generation, variants));
                Ok(applied.then_some(count))
            }
            Err(e) => {
                tracing::error!(item_code, error = %e, "variant fetch failed");
                session.update(|s| s.mark_variants_failed(generation, e.to_string()));
                Err(e)
            }
        }
    }

    async fn load_attributes(
        &self,
        session: &SessionHandle,
        generation: Generation,
        names: &[String],
        report: &mut LoadReport,
    ) {
        let mut pending: FuturesUnordered<_> = names
            .iter()
            .map(|name| async move {
                let result = self
                    .cache
                    .get_or_fetch(name, || self.client.fetch_attribute_detail(name))
                    .await;
                (name, result)
            })
            .collect();

        while let Some((name, result)) = pending.next().await {
            let applied = match result {
                Ok(mut detail) => {
                    if detail.name != *name {
                        tracing::debug!(
                            requested = %name,
                            returned = %detail.name,
                            "attribute document name differs from template row"
                        );
                        detail.name.clone_from(name);
                    }
                    let applied = session.update(|s| s.apply_attribute(generation, detail));
                    if applied {
                        report.attributes_ready += 1;
                    }
                    applied
                }
                Err(e) => {
                    tracing::warn!(attribute = %name, error = %e, "attribute detail unavailable");
                    let applied = session
                        .update(|s| s.mark_attribute_unavailable(generation, name, e.to_string()));
                    if applied {
                        report.attributes_unavailable.push(name.clone());
                    }
                    applied
                }
            };
            if !applied {
                report.superseded = true;
            }
        }
    }
}
