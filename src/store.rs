//! Reward Store
//!
//! The client-held collection of earned discount records, persisted as a
//! JSON-serialized list under a single storage key. Records are immutable
//! values; updates replace the set wholesale, so readers always see one
//! consistent snapshot. Expired records are filtered at read time, never
//! actively deleted.

use std::{fs, path::Path};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{discounts::DiscountPercent, products::ProductId, records::DiscountRecord};

/// Storage key the serialized record list lives under on the client.
pub const STORAGE_KEY: &str = "caterpillar-ranch.rewards";

/// Errors raised while loading or saving the reward store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error reading or writing the backing file.
    #[error("failed to read or write the reward store: {0}")]
    Io(#[from] std::io::Error),

    /// The stored JSON was malformed or a record failed validation.
    ///
    /// Record invariants are re-checked during deserialization, so a
    /// tampered record surfaces here too.
    #[error("failed to parse the reward store: {0}")]
    Json(#[from] serde_json::Error),
}

/// The client-held collection of earned discount records.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardStore {
    records: Vec<DiscountRecord>,
}

impl RewardStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an existing record set.
    #[must_use]
    pub fn with_records(records: Vec<DiscountRecord>) -> Self {
        Self { records }
    }

    /// Parse a store from its JSON wire form.
    ///
    /// Every record is re-validated on the way in; a malformed record fails
    /// the whole load rather than being silently dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] on malformed JSON or a record that
    /// violates its invariants.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the store to its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a store from a file path (the demo stand-in for client storage).
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path)?;

        Self::from_json(&contents)
    }

    /// Save the store to a file path, replacing the whole set.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let json = self.to_json()?;

        Ok(fs::write(path, json)?)
    }

    /// Insert a freshly earned record.
    pub fn grant(&mut self, record: DiscountRecord) {
        self.records.push(record);
    }

    /// All records, including expired and consumed ones.
    #[must_use]
    pub fn records(&self) -> &[DiscountRecord] {
        &self.records
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that can still discount `product` as of `now`: matching,
    /// unconsumed, and unexpired.
    #[must_use]
    pub fn active_for(&self, product: &ProductId, now: Timestamp) -> SmallVec<[&DiscountRecord; 4]> {
        self.records
            .iter()
            .filter(|record| record.matches(product) && record.is_active(now))
            .collect()
    }

    /// The best surviving record for `product` as of `now` (maximum percent;
    /// earned discounts never stack).
    #[must_use]
    pub fn best_for(&self, product: &ProductId, now: Timestamp) -> Option<&DiscountRecord> {
        self.records
            .iter()
            .filter(|record| record.matches(product) && record.is_active(now))
            .max_by_key(|record| record.percent())
    }

    /// Consume the best surviving record for `product`, flipping its
    /// `applied` flag. This is the "item added to the cart" transition; the
    /// resolved percent is returned so the cart line can carry it.
    pub fn consume(&mut self, product: &ProductId, now: Timestamp) -> Option<DiscountPercent> {
        let idx = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.matches(product) && record.is_active(now))
            .max_by_key(|(_, record)| record.percent())
            .map(|(idx, _)| idx)?;

        let record = self.records.get_mut(idx)?;

        record.mark_applied();

        Some(record.percent())
    }
}
