//! Cocoon prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{AppliedDiscount, Cart, CartError, CartPricing, LineItem, apply_discount},
    discounts::{DISCOUNT_CAP, DiscountError, DiscountPercent},
    fixtures::{Fixture, FixtureError},
    games::{DEFAULT_VALIDITY, GameError, GameOutcome, grant},
    products::{Product, ProductId},
    records::{DiscountRecord, RecordError, RecordId},
    store::{RewardStore, STORAGE_KEY, StoreError},
    summary::{CartSummary, SummaryError},
    tiers::{Tier, TierProgress, TierTable, TierTableError},
};
