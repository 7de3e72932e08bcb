//! Cart Summary
//!
//! Storefront-facing rendering of an evaluated cart: one row per line item
//! with its base price, discounted price and savings, plus cart totals and
//! the reward that produced each discount.

use std::io;

use decimal_percentage::Percentage;
use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::MoneyError;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    carts::{Cart, CartPricing, LinePricing},
    products::{Product, ProductId},
    store::RewardStore,
};

/// Errors that can occur when rendering a cart summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Error finding a product in the product catalog.
    #[error("Missing product {0}")]
    MissingProduct(ProductId),

    /// Wrapped cart lookup error.
    #[error(transparent)]
    Cart(#[from] crate::carts::CartError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Rendered view of an evaluated cart.
#[derive(Debug, Clone)]
pub struct CartSummary<'a> {
    pricing: CartPricing<'a>,
}

impl<'a> CartSummary<'a> {
    /// Wrap an evaluated cart for rendering.
    #[must_use]
    pub fn new(pricing: CartPricing<'a>) -> Self {
        Self { pricing }
    }

    /// The underlying pricing.
    #[must_use]
    pub fn pricing(&self) -> &CartPricing<'a> {
        &self.pricing
    }

    /// Calculates the savings made across the cart as a percentage.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings = self.pricing.savings()?;

        // Percent savings is relative to the original (pre-discount) subtotal.
        // Avoid integer division truncation by doing the ratio in decimal space.
        let savings_minor = savings.to_minor_units();
        let subtotal_minor = self.pricing.subtotal().to_minor_units();

        if subtotal_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / subtotal_dec))
    }

    /// Render the summary table and totals.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if a product is missing from the catalog
    /// or the output cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        cart: &Cart<'_>,
        products: &FxHashMap<ProductId, Product<'_>>,
        store: &RewardStore,
        now: Timestamp,
    ) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Qty", "Base Price", "Price", "Savings", "Reward"]);

        for line in self.pricing.lines() {
            let item = cart.get_item(line.item_idx)?;

            let product = products
                .get(item.product())
                .ok_or_else(|| SummaryError::MissingProduct(item.product().clone()))?;

            let savings = line.original.sub(line.final_price)?;

            builder.push_record([
                format!("#{:<3}", line.item_idx + 1),
                product.name.clone(),
                item.quantity().to_string(),
                line.original.to_string(),
                line.final_price.to_string(),
                if line.discount.is_none() {
                    String::new()
                } else {
                    format!("-{savings}")
                },
                reward_cell(line, item.product(), store, now),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::sharp());
        table.modify(Columns::new(2..=5), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| SummaryError::IO)?;

        self.write_totals(&mut out)?;

        Ok(())
    }

    fn write_totals(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let savings = self.pricing.savings()?;
        let percent = self.savings_percent()?;
        let percent_points = ((percent * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(1);

        writeln!(out, "Subtotal: {}", self.pricing.subtotal()).map_err(|_err| SummaryError::IO)?;
        writeln!(out, "Rewards:  -{savings} ({percent_points}%)")
            .map_err(|_err| SummaryError::IO)?;
        writeln!(out, "Total:    {}", self.pricing.total()).map_err(|_err| SummaryError::IO)?;

        Ok(())
    }
}

/// Describe the reward behind a discounted line: the honored percent, the
/// game that earned it, and how long the backing record stays redeemable.
fn reward_cell(
    line: &LinePricing<'_>,
    product: &ProductId,
    store: &RewardStore,
    now: Timestamp,
) -> String {
    if line.discount.is_none() {
        return String::new();
    }

    let percent = line.discount.percent();

    match store.best_for(product, now) {
        Some(record) => {
            let remaining = record.expires_at().duration_since(now).unsigned_abs();

            format!(
                "{percent} from {} (expires in {})",
                record.game(),
                remaining.human(Truncate::Minute)
            )
        }
        None => format!("{percent} earned"),
    }
}
