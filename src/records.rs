//! Discount Records
//!
//! A [`DiscountRecord`] is one earned, not-yet-consumed discount grant. The
//! records live in a client-held store, so everything read back is treated
//! as untrusted: deserialization re-validates every invariant. An expired
//! record is filtered out wherever discounts are evaluated rather than being
//! actively deleted.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, DiscountPercent},
    products::ProductId,
};

/// Length of generated record ids.
const RECORD_ID_LEN: usize = 12;

/// Errors raised while constructing or validating a discount record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A record's expiry was not strictly after its earned timestamp.
    #[error("record {0}: expiry must be after the earned timestamp")]
    ExpiryNotAfterEarned(RecordId),

    /// A validity window was zero or negative.
    #[error("validity window must be positive, got {0:#}")]
    NonPositiveValidity(SignedDuration),

    /// Adding the validity window overflowed the representable time range.
    #[error("record expiry is outside the representable time range")]
    ExpiryOutOfRange,

    /// Wrapped percent validation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Opaque identifier for a discount record, assigned at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a record id from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random alphanumeric id.
    #[must_use]
    pub fn generate() -> Self {
        let id: String = thread_rng()
            .sample_iter(Alphanumeric)
            .take(RECORD_ID_LEN)
            .map(char::from)
            .collect();

        Self(id)
    }

    /// Return the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One earned, not-yet-consumed discount grant with an expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDiscountRecord", into = "RawDiscountRecord")]
pub struct DiscountRecord {
    id: RecordId,
    product: ProductId,
    percent: DiscountPercent,
    game: String,
    earned_at: Timestamp,
    expires_at: Timestamp,
    applied: bool,
}

impl DiscountRecord {
    /// Create a record from explicit timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::ExpiryNotAfterEarned`] unless
    /// `expires_at > earned_at`.
    pub fn new(
        id: RecordId,
        product: ProductId,
        percent: DiscountPercent,
        game: impl Into<String>,
        earned_at: Timestamp,
        expires_at: Timestamp,
    ) -> Result<Self, RecordError> {
        if expires_at <= earned_at {
            return Err(RecordError::ExpiryNotAfterEarned(id));
        }

        Ok(Self {
            id,
            product,
            percent,
            game: game.into(),
            earned_at,
            expires_at,
            applied: false,
        })
    }

    /// Create a freshly earned record with a generated id and a validity
    /// window starting at `earned_at`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the window is not positive or the expiry
    /// falls outside the representable time range.
    pub fn grant(
        product: ProductId,
        percent: DiscountPercent,
        game: impl Into<String>,
        earned_at: Timestamp,
        validity: SignedDuration,
    ) -> Result<Self, RecordError> {
        if validity <= SignedDuration::ZERO {
            return Err(RecordError::NonPositiveValidity(validity));
        }

        let expires_at = earned_at
            .checked_add(validity)
            .map_err(|_err| RecordError::ExpiryOutOfRange)?;

        Self::new(
            RecordId::generate(),
            product,
            percent,
            game,
            earned_at,
            expires_at,
        )
    }

    /// Return the record id.
    #[must_use]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Return the product this discount applies to.
    #[must_use]
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Return the earned discount percent.
    #[must_use]
    pub fn percent(&self) -> DiscountPercent {
        self.percent
    }

    /// Return the tag of the mini-game that produced this record.
    #[must_use]
    pub fn game(&self) -> &str {
        &self.game
    }

    /// Return when the discount was earned.
    #[must_use]
    pub fn earned_at(&self) -> Timestamp {
        self.earned_at
    }

    /// Return when the discount expires.
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Whether this record has already been consumed.
    #[must_use]
    pub fn applied(&self) -> bool {
        self.applied
    }

    /// Whether this record targets the given product.
    #[must_use]
    pub fn matches(&self, product: &ProductId) -> bool {
        self.product == *product
    }

    /// Whether this record has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    /// Whether this record can still contribute a discount as of `now`:
    /// unconsumed and unexpired.
    #[must_use]
    pub fn is_active(&self, now: Timestamp) -> bool {
        !self.applied && !self.is_expired(now)
    }

    /// Consume the record, flipping `applied` to true.
    ///
    /// Returns whether the flip happened; a record is consumed at most once
    /// and later calls are no-ops.
    pub fn mark_applied(&mut self) -> bool {
        let transitioned = !self.applied;

        self.applied = true;

        transitioned
    }
}

/// Wire shape of a record in the client store, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawDiscountRecord {
    id: RecordId,
    product: ProductId,
    percent: u8,
    game: String,
    earned_at: Timestamp,
    expires_at: Timestamp,
    #[serde(default)]
    applied: bool,
}

impl TryFrom<RawDiscountRecord> for DiscountRecord {
    type Error = RecordError;

    fn try_from(raw: RawDiscountRecord) -> Result<Self, Self::Error> {
        let percent = DiscountPercent::try_from(raw.percent).map_err(RecordError::from)?;

        let mut record = Self::new(
            raw.id,
            raw.product,
            percent,
            raw.game,
            raw.earned_at,
            raw.expires_at,
        )?;

        // A stored record may legitimately already be consumed.
        record.applied = raw.applied;

        Ok(record)
    }
}

impl From<DiscountRecord> for RawDiscountRecord {
    fn from(record: DiscountRecord) -> Self {
        Self {
            id: record.id,
            product: record.product,
            percent: record.percent.points(),
            game: record.game,
            earned_at: record.earned_at,
            expires_at: record.expires_at,
            applied: record.applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn ts(s: &str) -> TestResult<Timestamp> {
        Ok(s.parse()?)
    }

    fn sample_record() -> TestResult<DiscountRecord> {
        Ok(DiscountRecord::new(
            RecordId::new("rec-chrysalis"),
            ProductId::from("gummy-grubs"),
            DiscountPercent::try_from(12)?,
            "card-cull",
            ts("2025-06-01T00:00:00Z")?,
            ts("2025-06-02T00:00:00Z")?,
        )?)
    }

    #[test]
    fn new_rejects_expiry_at_or_before_earned() -> TestResult {
        let earned = ts("2025-06-01T00:00:00Z")?;

        let result = DiscountRecord::new(
            RecordId::new("rec-bad"),
            ProductId::from("moth-balm"),
            DiscountPercent::try_from(6)?,
            "grub-dash",
            earned,
            earned,
        );

        assert!(matches!(result, Err(RecordError::ExpiryNotAfterEarned(_))));

        Ok(())
    }

    #[test]
    fn grant_builds_expiry_from_validity_window() -> TestResult {
        let earned = ts("2025-06-01T00:00:00Z")?;

        let record = DiscountRecord::grant(
            ProductId::from("moth-balm"),
            DiscountPercent::try_from(6)?,
            "grub-dash",
            earned,
            SignedDuration::from_hours(24),
        )?;

        assert_eq!(record.expires_at(), ts("2025-06-02T00:00:00Z")?);
        assert!(!record.applied());

        Ok(())
    }

    #[test]
    fn grant_rejects_non_positive_validity() -> TestResult {
        let earned = ts("2025-06-01T00:00:00Z")?;

        let result = DiscountRecord::grant(
            ProductId::from("moth-balm"),
            DiscountPercent::try_from(6)?,
            "grub-dash",
            earned,
            SignedDuration::ZERO,
        );

        assert!(matches!(result, Err(RecordError::NonPositiveValidity(_))));

        Ok(())
    }

    #[test]
    fn generated_ids_are_distinct() {
        let first = RecordId::generate();
        let second = RecordId::generate();

        assert_eq!(first.as_str().len(), RECORD_ID_LEN);
        assert_ne!(first, second);
    }

    #[test]
    fn expiry_is_enforced_at_read_time() -> TestResult {
        let record = sample_record()?;

        assert!(!record.is_expired(ts("2025-06-01T12:00:00Z")?));
        assert!(record.is_active(ts("2025-06-01T12:00:00Z")?));

        // The boundary instant itself counts as expired.
        assert!(record.is_expired(ts("2025-06-02T00:00:00Z")?));
        assert!(!record.is_active(ts("2025-06-02T00:00:00Z")?));

        Ok(())
    }

    #[test]
    fn mark_applied_flips_exactly_once() -> TestResult {
        let mut record = sample_record()?;

        assert!(record.mark_applied());
        assert!(record.applied());
        assert!(!record.mark_applied());
        assert!(!record.is_active(ts("2025-06-01T12:00:00Z")?));

        Ok(())
    }

    #[test]
    fn deserialization_rejects_tampered_percent() -> TestResult {
        let json = r#"{
            "id": "rec-tampered",
            "product": "gummy-grubs",
            "percent": 160,
            "game": "card-cull",
            "earned_at": "2025-06-01T00:00:00Z",
            "expires_at": "2025-06-02T00:00:00Z"
        }"#;

        let result: Result<DiscountRecord, _> = serde_json::from_str(json);

        assert!(result.is_err());

        Ok(())
    }

    #[test]
    fn deserialization_rejects_inverted_expiry() {
        let json = r#"{
            "id": "rec-inverted",
            "product": "gummy-grubs",
            "percent": 12,
            "game": "card-cull",
            "earned_at": "2025-06-02T00:00:00Z",
            "expires_at": "2025-06-01T00:00:00Z"
        }"#;

        let result: Result<DiscountRecord, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }

    #[test]
    fn deserialization_accepts_over_cap_but_in_range_percent() -> TestResult {
        // A tampered store claiming 60% is structurally valid; the cart-level
        // cap clamps it at application time instead of rejecting it here.
        let json = r#"{
            "id": "rec-greedy",
            "product": "gummy-grubs",
            "percent": 60,
            "game": "card-cull",
            "earned_at": "2025-06-01T00:00:00Z",
            "expires_at": "2025-06-02T00:00:00Z"
        }"#;

        let record: DiscountRecord = serde_json::from_str(json)?;

        assert_eq!(record.percent().points(), 60);

        Ok(())
    }

    #[test]
    fn applied_defaults_to_false_on_the_wire() -> TestResult {
        let record = sample_record()?;
        let json = serde_json::to_string(&record)?;
        let restored: DiscountRecord = serde_json::from_str(&json)?;

        assert_eq!(restored, record);
        assert!(!restored.applied());

        Ok(())
    }
}
