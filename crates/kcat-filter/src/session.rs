//! Filter state for the template currently being browsed.
//!
//! Catalog data for a template arrives asynchronously and in any order: the
//! template itself, its variants, and one detail per attribute. Every write
//! carries the [`Generation`] handed out by [`FilterSession::begin_template`];
//! writes from an older generation (the user has since moved to another
//! template) are dropped. Results are recomputed from current state on every
//! [`FilterSession::result`] call, so a late-arriving attribute detail is
//! reflected immediately.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use kcat_core::{AttributeDetail, AttributeSchema, TemplateAttribute, Variant};
use tokio::sync::watch;

use crate::decode::{DecodedTable, SkuLayout};
use crate::evaluate::{filter_decoded, FilterSelection, FilterValue};
use crate::pagination::PageWindow;
use crate::schema::{resolve_schema, AttributePositions};

/// Identifies one `begin_template` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeState {
    Pending,
    Ready,
    /// The detail fetch failed; filters on this attribute stay inert.
    Unavailable(String),
}

#[derive(Debug)]
pub struct FilteredResult<'a> {
    /// Every matching variant, in fetch order.
    pub matches: Vec<&'a Variant>,
    pub window: PageWindow,
}

impl<'a> FilteredResult<'a> {
    /// The variants on the current page.
    #[must_use]
    pub fn page_items(&self) -> &[&'a Variant] {
        &self.matches[self.window.range()]
    }
}

#[derive(Debug)]
pub struct FilterSession {
    layout: SkuLayout,
    page_size: usize,
    generation: u64,
    revision: u64,
    template: Option<String>,
    template_state: LoadState,
    variants_state: LoadState,
    positions: AttributePositions,
    attribute_states: HashMap<String, AttributeState>,
    details: HashMap<String, AttributeDetail>,
    schemas: HashMap<String, AttributeSchema>,
    variants: Vec<Variant>,
    decoded: DecodedTable,
    filters: FilterSelection,
    page: usize,
}

impl FilterSession {
    #[must_use]
    pub fn new(layout: SkuLayout, page_size: usize) -> Self {
        Self {
            layout,
            page_size: page_size.max(1),
            generation: 0,
            revision: 0,
            template: None,
            template_state: LoadState::Idle,
            variants_state: LoadState::Idle,
            positions: AttributePositions::default(),
            attribute_states: HashMap::new(),
            details: HashMap::new(),
            schemas: HashMap::new(),
            variants: Vec::new(),
            decoded: DecodedTable::default(),
            filters: FilterSelection::new(),
            page: 1,
        }
    }

    /// Switches to a new template, discarding all state of the previous one.
    ///
    /// The returned token must accompany every write for this template.
    pub fn begin_template(&mut self, item_code: &str) -> Generation {
        self.generation += 1;
        self.template = Some(item_code.to_owned());
        self.template_state = LoadState::Loading;
        self.variants_state = LoadState::Loading;
        self.positions = AttributePositions::default();
        self.attribute_states.clear();
        self.details.clear();
        self.schemas.clear();
        self.variants.clear();
        self.decoded = DecodedTable::default();
        self.filters.clear_all();
        self.page = 1;
        self.touch();
        Generation(self.generation)
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    fn accept(&self, generation: Generation, what: &str) -> bool {
        if self.is_current(generation) {
            return true;
        }
        tracing::debug!(
            stale = generation.0,
            current = self.generation,
            what,
            "dropping stale catalog update"
        );
        false
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Records the template's attribute list and resolves positions.
    ///
    /// Returns `false` if the update was stale and dropped.
    pub fn apply_template(
        &mut self,
        generation: Generation,
        attributes: &[TemplateAttribute],
    ) -> bool {
        if !self.accept(generation, "template") {
            return false;
        }
        self.positions = resolve_schema(attributes);
        // Details or failures may already have arrived for some names.
        for (name, _) in self.positions.iter() {
            self.attribute_states
                .entry(name.to_owned())
                .or_insert(AttributeState::Pending);
        }
        self.schemas = self.positions.bind(|name| self.details.get(name));
        self.template_state = LoadState::Ready;
        self.touch();
        true
    }

    pub fn mark_template_failed(
        &mut self,
        generation: Generation,
        reason: impl Into<String>,
    ) -> bool {
        if !self.accept(generation, "template failure") {
            return false;
        }
        self.template_state = LoadState::Failed(reason.into());
        self.touch();
        true
    }

    /// Replaces the variant set and rebuilds its decoded-token table.
    pub fn apply_variants(&mut self, generation: Generation, variants: Vec<Variant>) -> bool {
        if !self.accept(generation, "variants") {
            return false;
        }
        self.decoded = DecodedTable::build(&variants, &self.layout);
        self.variants = variants;
        self.variants_state = LoadState::Ready;
        self.page = 1;
        self.touch();
        true
    }

    pub fn mark_variants_failed(
        &mut self,
        generation: Generation,
        reason: impl Into<String>,
    ) -> bool {
        if !self.accept(generation, "variants failure") {
            return false;
        }
        self.variants_state = LoadState::Failed(reason.into());
        self.touch();
        true
    }

    /// Stores an attribute detail, activating filters on that attribute.
    ///
    /// Details for attributes the template does not declare are kept (the
    /// template list may still be in flight) but produce no schema until the
    /// template declares them.
    pub fn apply_attribute(&mut self, generation: Generation, detail: AttributeDetail) -> bool {
        if !self.accept(generation, "attribute detail") {
            return false;
        }
        let name = detail.name.clone();
        if let Some(position) = self.positions.position_of(&name) {
            self.schemas.insert(
                name.clone(),
                AttributeSchema::from_detail(detail.clone(), position),
            );
        }
        self.details.insert(name.clone(), detail);
        self.attribute_states.insert(name, AttributeState::Ready);
        self.touch();
        true
    }

    pub fn mark_attribute_unavailable(
        &mut self,
        generation: Generation,
        name: &str,
        reason: impl Into<String>,
    ) -> bool {
        if !self.accept(generation, "attribute failure") {
            return false;
        }
        self.attribute_states
            .insert(name.to_owned(), AttributeState::Unavailable(reason.into()));
        self.touch();
        true
    }

    /// Sets one filter and returns to the first page.
    pub fn set_filter(&mut self, attribute: impl Into<String>, value: impl Into<FilterValue>) {
        self.filters.set(attribute, value);
        self.page = 1;
        self.touch();
    }

    /// Removes one filter and returns to the first page.
    pub fn clear_filter(&mut self, attribute: &str) {
        self.filters.clear(attribute);
        self.page = 1;
        self.touch();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear_all();
        self.page = 1;
        self.touch();
    }

    /// Page 0 is read as page 1.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
        self.touch();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
        self.touch();
    }

    /// Matches for the current state, with the active page window.
    #[must_use]
    pub fn result(&self) -> FilteredResult<'_> {
        let matches = filter_decoded(&self.variants, &self.decoded, &self.filters, &self.schemas);
        let window = PageWindow::new(self.page, self.page_size, matches.len());
        FilteredResult { matches, window }
    }

    #[must_use]
    pub fn template_code(&self) -> Option<&str> {
        self.template.as_deref()
    }

    #[must_use]
    pub fn template_state(&self) -> &LoadState {
        &self.template_state
    }

    #[must_use]
    pub fn variants_state(&self) -> &LoadState {
        &self.variants_state
    }

    #[must_use]
    pub fn attribute_state(&self, name: &str) -> Option<&AttributeState> {
        self.attribute_states.get(name)
    }

    #[must_use]
    pub fn positions(&self) -> &AttributePositions {
        &self.positions
    }

    #[must_use]
    pub fn schemas(&self) -> &HashMap<String, AttributeSchema> {
        &self.schemas
    }

    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn layout(&self) -> &SkuLayout {
        &self.layout
    }

    /// Increases on every accepted change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Shared access to a [`FilterSession`] with change notification.
///
/// Subscribers receive the session revision after every update that
/// changed it.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<FilterSession>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(session: FilterSession) -> Self {
        let (tx, _rx) = watch::channel(session.revision());
        Self {
            inner: Arc::new(Mutex::new(session)),
            revision: Arc::new(tx),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&FilterSession) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut FilterSession) -> R) -> R {
        let (out, before, after) = {
            let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            let before = guard.revision();
            let out = f(&mut guard);
            (out, before, guard.revision())
        };
        if after != before {
            self.revision.send_replace(after);
        }
        out
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
