use kcat_core::Variant;

use super::{ErpClient, MAX_PAGES};
use crate::error::ErpError;

impl ErpClient {
    /// Fetches every variant of a template by walking `limit_start` pages.
    ///
    /// Stops at the first page with fewer rows than `page_limit`. Order follows
    /// the ERP's `item_code asc` ordering and is preserved across pages.
    ///
    /// # Errors
    ///
    /// - [`ErpError::PaginationLimit`] if [`MAX_PAGES`] full pages are returned.
    /// - Any error from [`ErpClient::fetch_variants_page`].
    pub async fn fetch_all_variants(
        &self,
        template_code: &str,
        page_limit: u32,
    ) -> Result<Vec<Variant>, ErpError> {
        let page_limit = page_limit.max(1);
        let mut all = Vec::new();
        let mut start: u64 = 0;

        for page in 0..MAX_PAGES {
            let mut batch = self.variant_page(template_code, start, page_limit).await?;
            let rows = batch.row_count;
            all.append(&mut batch.variants);

            tracing::debug!(
                template_code,
                page,
                rows,
                total = all.len(),
                "fetched variant page"
            );

            if rows < page_limit as usize {
                return Ok(all);
            }
            start += u64::from(page_limit);
        }

        Err(ErpError::PaginationLimit {
            template: template_code.to_owned(),
            max_pages: MAX_PAGES,
        })
    }
}
