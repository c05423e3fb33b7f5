//! Quote cart and wishlist stores.
//!
//! Both are plain keyed collections used to compose a quote request; there is
//! no pricing, payment or stock logic here. The only invariant is that every
//! cart line has `quantity >= 1`. [`QuoteStore`] persists both collections as
//! one JSON document on local disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub item_code: String,
    pub item_name: String,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteCart {
    #[serde(default)]
    lines: Vec<QuoteLine>,
}

impl QuoteCart {
    /// Adds `quantity` units of an item, merging into an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuantity`] when `quantity` is zero.
    pub fn add(
        &mut self,
        item_code: &str,
        item_name: &str,
        quantity: u32,
    ) -> Result<&QuoteLine, CoreError> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity {
                item_code: item_code.to_owned(),
                quantity,
            });
        }

        let idx = if let Some(idx) = self.position(item_code) {
            let line = &mut self.lines[idx];
            line.quantity = line.quantity.saturating_add(quantity);
            idx
        } else {
            self.lines.push(QuoteLine {
                item_code: item_code.to_owned(),
                item_name: item_name.to_owned(),
                quantity,
                added_at: Utc::now(),
            });
            self.lines.len() - 1
        };
        Ok(&self.lines[idx])
    }

    /// Removes an item's line. Returns `false` if it was not in the cart.
    pub fn remove(&mut self, item_code: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.item_code != item_code);
        self.lines.len() != before
    }

    /// Replaces the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidQuantity`] when `quantity` is zero (use [`Self::remove`]).
    /// - [`CoreError::NotInCart`] when the item has no line.
    pub fn set_quantity(&mut self, item_code: &str, quantity: u32) -> Result<(), CoreError> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity {
                item_code: item_code.to_owned(),
                quantity,
            });
        }
        let idx = self
            .position(item_code)
            .ok_or_else(|| CoreError::NotInCart(item_code.to_owned()))?;
        self.lines[idx].quantity = quantity;
        Ok(())
    }

    #[must_use]
    pub fn lines(&self) -> &[QuoteLine] {
        &self.lines
    }

    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn position(&self, item_code: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.item_code == item_code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    #[serde(default)]
    item_codes: Vec<String>,
}

impl Wishlist {
    /// Returns `false` if the item was already present.
    pub fn add(&mut self, item_code: &str) -> bool {
        if self.contains(item_code) {
            return false;
        }
        self.item_codes.push(item_code.to_owned());
        true
    }

    /// Returns `false` if the item was not present.
    pub fn remove(&mut self, item_code: &str) -> bool {
        let before = self.item_codes.len();
        self.item_codes.retain(|c| c != item_code);
        self.item_codes.len() != before
    }

    /// Flips membership and returns whether the item is now present.
    pub fn toggle(&mut self, item_code: &str) -> bool {
        if self.remove(item_code) {
            false
        } else {
            self.item_codes.push(item_code.to_owned());
            true
        }
    }

    #[must_use]
    pub fn contains(&self, item_code: &str) -> bool {
        self.item_codes.iter().any(|c| c == item_code)
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.item_codes
    }
}

/// The persisted document: both collections side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteState {
    #[serde(default)]
    pub cart: QuoteCart,
    #[serde(default)]
    pub wishlist: Wishlist,
}

/// JSON file persistence for [`QuoteState`].
pub struct QuoteStore {
    path: PathBuf,
}

impl QuoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored state; a missing file is an empty state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the file exists but cannot be read, or
    /// [`CoreError::Serde`] if it is not a valid quote document, or
    /// [`CoreError::InvalidQuantity`] if a cart line holds zero units.
    pub fn load(&self) -> Result<QuoteState, CoreError> {
        if !self.path.exists() {
            return Ok(QuoteState::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| self.io_err(source))?;
        let state: QuoteState = serde_json::from_str(&raw).map_err(|source| CoreError::Serde {
            path: self.path.display().to_string(),
            source,
        })?;

        if let Some(line) = state.cart.lines().iter().find(|l| l.quantity == 0) {
            return Err(CoreError::InvalidQuantity {
                item_code: line.item_code.clone(),
                quantity: line.quantity,
            });
        }
        Ok(state)
    }

    /// Writes the state, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] on filesystem failure.
    pub fn save(&self, state: &QuoteState) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_err(source))?;
        }
        let body = serde_json::to_string_pretty(state).map_err(|source| CoreError::Serde {
            path: self.path.display().to_string(),
            source,
        })?;
        fs::write(&self.path, body).map_err(|source| self.io_err(source))
    }

    fn io_err(&self, source: std::io::Error) -> CoreError {
        CoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_merges_quantity_into_existing_line() {
        let mut cart = QuoteCart::default();
        cart.add("RNG-6B-0001-G", "Range 6 Burner Gas", 1).unwrap();
        let line = cart.add("RNG-6B-0001-G", "Range 6 Burner Gas", 2).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let mut cart = QuoteCart::default();
        let err = cart.add("X", "X", 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { quantity: 0, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_requires_existing_line() {
        let mut cart = QuoteCart::default();
        let err = cart.set_quantity("missing", 2).unwrap_err();
        assert!(matches!(err, CoreError::NotInCart(ref c) if c == "missing"));
    }

    #[test]
    fn set_quantity_rejects_zero_and_keeps_line() {
        let mut cart = QuoteCart::default();
        cart.add("A", "A", 4).unwrap();
        assert!(cart.set_quantity("A", 0).is_err());
        assert_eq!(cart.lines()[0].quantity, 4);
        cart.set_quantity("A", 7).unwrap();
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[test]
    fn remove_reports_presence() {
        let mut cart = QuoteCart::default();
        cart.add("A", "A", 1).unwrap();
        assert!(cart.remove("A"));
        assert!(!cart.remove("A"));
    }

    #[test]
    fn wishlist_add_is_idempotent_and_toggle_flips() {
        let mut wishlist = Wishlist::default();
        assert!(wishlist.add("A"));
        assert!(!wishlist.add("A"));
        assert!(!wishlist.toggle("A"));
        assert!(!wishlist.contains("A"));
        assert!(wishlist.toggle("A"));
        assert_eq!(wishlist.items(), ["A".to_string()]);
    }

    #[test]
    fn store_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuoteStore::new(dir.path().join("quote.json"));
        assert_eq!(store.load().unwrap(), QuoteState::default());
    }

    #[test]
    fn store_save_then_load_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuoteStore::new(dir.path().join("nested").join("quote.json"));

        let mut state = QuoteState::default();
        state.cart.add("A-B-C-0001-S-5", "Prep Table", 2).unwrap();
        state.wishlist.add("A-B-C-0001-L-3");
        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn store_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = QuoteStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CoreError::Serde { .. }));
    }

    #[test]
    fn store_load_rejects_zero_quantity_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote.json");
        let body = serde_json::json!({
            "cart": { "lines": [{
                "item_code": "A-B-C-0001-S-5",
                "item_name": "Prep Table",
                "quantity": 0,
                "added_at": "2026-01-05T10:00:00Z"
            }]},
            "wishlist": { "item_codes": [] }
        });
        std::fs::write(&path, body.to_string()).unwrap();

        let err = QuoteStore::new(&path).load().unwrap_err();
        assert!(
            matches!(
                err,
                CoreError::InvalidQuantity { ref item_code, quantity: 0 }
                    if item_code == "A-B-C-0001-S-5"
            ),
            "got {err:?}"
        );
    }
}
