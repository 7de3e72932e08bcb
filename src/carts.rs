//! Carts
//!
//! Cart evaluation is pure and synchronous: callers pass the record set and
//! an explicit `now`, so one evaluation reads a single consistent snapshot.
//! The discount cap is enforced here, after best-record selection — the
//! client-held store is untrusted at application time, and an over-cap value
//! is clamped rather than rejected.

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::{DISCOUNT_CAP, DiscountError, DiscountPercent},
    products::ProductId,
    records::DiscountRecord,
};

/// Errors related to cart construction or discount application.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// An item was not found in the cart.
    #[error("Item {0} not found")]
    ItemNotFound(usize),

    /// A subtotal was negative; discounts are only defined for non-negative amounts.
    #[error("subtotal must not be negative, got {0} minor units")]
    NegativeSubtotal(i64),

    /// A line's quantity multiplied its unit price out of range.
    #[error("item quantity overflows the line subtotal")]
    QuantityOverflow,

    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One line of a cart: a product at a unit price, a quantity, and the
/// at-most-one earned discount resolved onto it when its record was consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    product: ProductId,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    earned_discount: Option<DiscountPercent>,
}

impl<'a> LineItem<'a> {
    /// Create a line item with no resolved discount.
    #[must_use]
    pub fn new(product: ProductId, unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            product,
            unit_price,
            quantity,
            earned_discount: None,
        }
    }

    /// Create a line item carrying an already-resolved earned discount.
    #[must_use]
    pub fn with_discount(
        product: ProductId,
        unit_price: Money<'a, Currency>,
        quantity: u32,
        earned_discount: DiscountPercent,
    ) -> Self {
        Self {
            product,
            unit_price,
            quantity,
            earned_discount: Some(earned_discount),
        }
    }

    /// Return the product of the line item.
    #[must_use]
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Return the unit price of the line item.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Return the quantity of the line item.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Return the resolved earned discount, if one has been applied.
    #[must_use]
    pub fn earned_discount(&self) -> Option<DiscountPercent> {
        self.earned_discount
    }

    /// Resolve an earned discount onto this line (the record was consumed).
    pub fn set_earned_discount(&mut self, percent: DiscountPercent) {
        self.earned_discount = Some(percent);
    }

    /// Calculate the line subtotal: unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityOverflow`] if the multiplication leaves
    /// the representable range.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(CartError::QuantityOverflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    items: Vec<LineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given line items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a currency mismatch error.
    pub fn with_items(
        items: impl Into<Vec<LineItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            let item_currency = item.unit_price().currency();

            if item_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart { items, currency })
    }

    /// Calculate the subtotal of the cart before any discounts.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line subtotal or the sum overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        self.items
            .iter()
            .try_fold(Money::from_minor(0, self.currency), |acc, item| {
                Ok(acc.add(item.subtotal()?)?)
            })
    }

    /// Get a line item from the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::ItemNotFound` if the item is not found.
    pub fn get_item(&self, item: usize) -> Result<&LineItem<'a>, CartError> {
        self.items.get(item).ok_or(CartError::ItemNotFound(item))
    }

    /// Iterate over the line items in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem<'a>> {
        self.items.iter()
    }

    /// Get the number of line items in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Evaluate every line against the record set at one instant.
    ///
    /// Each line considers its own resolved discount alongside any still
    /// unconsumed records for its product; the candidates never stack, and
    /// the winning percent is capped like any other.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a subtotal or discount calculation fails.
    pub fn evaluate(
        &self,
        records: &[DiscountRecord],
        now: Timestamp,
    ) -> Result<CartPricing<'a>, CartError> {
        let mut lines = Vec::with_capacity(self.items.len());
        let mut subtotal = Money::from_minor(0, self.currency);
        let mut total = Money::from_minor(0, self.currency);

        for (item_idx, item) in self.items.iter().enumerate() {
            let original = item.subtotal()?;

            let candidate = best_record_percent(records, item.product(), now)
                .into_iter()
                .chain(item.earned_discount())
                .max();

            let discount = resolve(original, candidate, DISCOUNT_CAP)?;
            let final_price = original.sub(*discount.amount())?;

            subtotal = subtotal.add(original)?;
            total = total.add(final_price)?;

            lines.push(LinePricing {
                item_idx,
                original,
                discount,
                final_price,
            });
        }

        Ok(CartPricing {
            lines,
            subtotal,
            total,
            currency: self.currency,
        })
    }
}

/// The discount actually charged against one subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount<'a> {
    amount: Money<'a, Currency>,
    percent: DiscountPercent,
}

impl<'a> AppliedDiscount<'a> {
    /// A zero discount in the given currency.
    #[must_use]
    pub fn none(currency: &'a Currency) -> Self {
        Self {
            amount: Money::from_minor(0, currency),
            percent: DiscountPercent::ZERO,
        }
    }

    /// Amount taken off the subtotal.
    #[must_use]
    pub fn amount(&self) -> &Money<'a, Currency> {
        &self.amount
    }

    /// The honored percent: the selected record's percent, clamped to the cap.
    #[must_use]
    pub fn percent(&self) -> DiscountPercent {
        self.percent
    }

    /// Whether any discount was applied at all.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.percent.is_zero()
    }
}

/// Per-line pricing produced by [`Cart::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinePricing<'a> {
    /// Index of the line item in the cart.
    pub item_idx: usize,

    /// Line subtotal before any discount.
    pub original: Money<'a, Currency>,

    /// The discount charged against this line.
    pub discount: AppliedDiscount<'a>,

    /// Line total after the discount.
    pub final_price: Money<'a, Currency>,
}

/// Whole-cart pricing produced by [`Cart::evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct CartPricing<'a> {
    lines: Vec<LinePricing<'a>>,
    subtotal: Money<'a, Currency>,
    total: Money<'a, Currency>,
    currency: &'static Currency,
}

impl<'a> CartPricing<'a> {
    /// Per-line pricing, in cart order.
    #[must_use]
    pub fn lines(&self) -> &[LinePricing<'a>] {
        &self.lines
    }

    /// Cart subtotal before discounts.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Cart total after discounts.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Total amount saved across the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total)
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Resolve the applicable discount for one line-item subtotal.
///
/// This is the cap-enforcement point of the whole system: records are
/// filtered (matching, unconsumed, unexpired), the single best percent is
/// selected — earned discounts never stack — and only then is the amount
/// clamped to [`DISCOUNT_CAP`]. An honestly earned at-cap record passes
/// through exactly; a larger or tampered value is silently reduced.
///
/// # Errors
///
/// Returns [`CartError::NegativeSubtotal`] for a negative subtotal, or a
/// wrapped [`DiscountError`] if percent arithmetic fails.
pub fn apply_discount<'a>(
    subtotal: Money<'a, Currency>,
    records: &[DiscountRecord],
    product: &ProductId,
    now: Timestamp,
) -> Result<AppliedDiscount<'a>, CartError> {
    apply_discount_with_cap(subtotal, records, product, now, DISCOUNT_CAP)
}

/// [`apply_discount`], but against an explicit cap instead of the system
/// constant. The mechanism is identical under any cap value.
///
/// # Errors
///
/// Returns [`CartError::NegativeSubtotal`] for a negative subtotal, or a
/// wrapped [`DiscountError`] if percent arithmetic fails.
pub fn apply_discount_with_cap<'a>(
    subtotal: Money<'a, Currency>,
    records: &[DiscountRecord],
    product: &ProductId,
    now: Timestamp,
    cap: DiscountPercent,
) -> Result<AppliedDiscount<'a>, CartError> {
    let selected = best_record_percent(records, product, now);

    resolve(subtotal, selected, cap)
}

/// Best surviving percent among the records for one product, if any.
fn best_record_percent(
    records: &[DiscountRecord],
    product: &ProductId,
    now: Timestamp,
) -> Option<DiscountPercent> {
    records
        .iter()
        .filter(|record| record.matches(product) && record.is_active(now))
        .map(DiscountRecord::percent)
        .max()
}

/// Steps 3-5 of the applicator: requested amount, capped amount, minimum.
fn resolve<'a>(
    subtotal: Money<'a, Currency>,
    selected: Option<DiscountPercent>,
    cap: DiscountPercent,
) -> Result<AppliedDiscount<'a>, CartError> {
    let subtotal_minor = subtotal.to_minor_units();

    if subtotal_minor < 0 {
        return Err(CartError::NegativeSubtotal(subtotal_minor));
    }

    let Some(selected) = selected else {
        return Ok(AppliedDiscount::none(subtotal.currency()));
    };

    if subtotal_minor == 0 {
        return Ok(AppliedDiscount::none(subtotal.currency()));
    }

    let requested = selected.amount_of_minor(subtotal_minor)?;
    let capped = cap.amount_of_minor(subtotal_minor)?;

    Ok(AppliedDiscount {
        amount: Money::from_minor(requested.min(capped), subtotal.currency()),
        percent: selected.min(cap),
    })
}
