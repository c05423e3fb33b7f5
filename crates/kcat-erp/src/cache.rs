//! Process-wide cache of `Item Attribute` details.
//!
//! Attribute definitions are shared by many templates and change rarely, so
//! each one is fetched at most once per process. Concurrent requests for the
//! same name share a single in-flight fetch. Failed fetches are not cached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use kcat_core::AttributeDetail;
use tokio::sync::OnceCell;

use crate::error::ErpError;

#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<AttributeDetail>>>>,
}

impl AttributeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached detail for `name`, if a fetch has completed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<AttributeDetail> {
        self.lock().get(name).and_then(|cell| cell.get().cloned())
    }

    /// Returns the cached detail or runs `fetch` to populate it.
    ///
    /// Callers racing on the same `name` wait for the first fetch instead of
    /// issuing their own.
    ///
    /// # Errors
    ///
    /// Returns the error from `fetch`. The entry stays empty so the next
    /// call retries.
    pub async fn get_or_fetch<F, Fut>(&self, name: &str, fetch: F) -> Result<AttributeDetail, ErpError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AttributeDetail, ErpError>>,
    {
        let cell = self.cell(name);
        if let Some(detail) = cell.get() {
            tracing::debug!(attribute = name, "attribute cache hit");
            return Ok(detail.clone());
        }

        tracing::debug!(attribute = name, "attribute cache miss");
        cell.get_or_try_init(fetch).await.cloned()
    }

    /// Number of attributes with a completed fetch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().values().filter(|cell| cell.initialized()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry. In-flight fetches complete into their detached cells.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn cell(&self, name: &str) -> Arc<OnceCell<AttributeDetail>> {
        Arc::clone(self.lock().entry(name.to_owned()).or_default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<OnceCell<AttributeDetail>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
