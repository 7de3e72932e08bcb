//! Integration test for fixture-driven cart evaluation.
//!
//! The storefront fixture set describes a realistic session:
//!
//! - Gummy Grubs, 2 x $4.99, with two live grants (12% and 6%) — only the
//!   12% one applies: $9.98 -> $8.78 (120 cents saved, max not sum).
//! - Moth Balm, 1 x $12.50, with an expired 9% grant — full price.
//! - Silk Shroud Tee, 1 x $24.00, with an already-consumed 15% grant —
//!   full price.
//!
//! Expected subtotal: $46.48 (4648 cents); expected total: $45.28.

use jiff::Timestamp;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use cocoon::{fixtures::Fixture, products::ProductId, store::RewardStore, summary::CartSummary};

fn now() -> TestResult<Timestamp> {
    Ok("2025-06-15T00:00:00Z".parse()?)
}

#[test]
fn storefront_cart_prices_every_line() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let cart = fixture.cart(None)?;

    let pricing = cart.evaluate(fixture.store().records(), now()?)?;

    assert_eq!(pricing.subtotal(), Money::from_minor(4_648, USD));
    assert_eq!(pricing.total(), Money::from_minor(4_528, USD));
    assert_eq!(pricing.savings()?, Money::from_minor(120, USD));

    let lines = pricing.lines();

    // Gummy Grubs: the 12% grant wins over the 6% one; they never stack.
    assert_eq!(
        lines.first().map(|l| l.discount.percent().points()),
        Some(12)
    );
    assert_eq!(
        lines.first().map(|l| l.final_price),
        Some(Money::from_minor(878, USD))
    );

    // Moth Balm: the expired grant contributes nothing.
    assert_eq!(lines.get(1).map(|l| l.discount.is_none()), Some(true));

    // Silk Shroud Tee: the consumed grant contributes nothing.
    assert_eq!(lines.get(2).map(|l| l.discount.is_none()), Some(true));

    Ok(())
}

#[test]
fn consuming_a_grant_resolves_it_onto_the_line_without_double_dipping() -> TestResult {
    let mut fixture = Fixture::from_set("storefront")?;
    let now = now()?;

    // Add-to-cart: the best grubs grant is spent and its percent resolved.
    let resolved = fixture
        .store_mut()
        .consume(&ProductId::from("gummy-grubs"), now);

    assert_eq!(resolved.map(cocoon::discounts::DiscountPercent::points), Some(12));

    let mut items = fixture.items().to_vec();

    if let Some(resolved) = resolved
        && let Some(line) = items.first_mut()
    {
        line.set_earned_discount(resolved);
    }

    let cart = cocoon::carts::Cart::with_items(items, fixture.currency()?)?;
    let pricing = cart.evaluate(fixture.store().records(), now)?;

    // The resolved 12% and the still-live 6% grant must not stack: the cart
    // charges the same $1.20 off as before the consume.
    assert_eq!(pricing.total(), Money::from_minor(4_528, USD));

    Ok(())
}

#[test]
fn consumed_state_survives_a_store_round_trip() -> TestResult {
    let mut fixture = Fixture::from_set("storefront")?;
    let now = now()?;

    fixture
        .store_mut()
        .consume(&ProductId::from("gummy-grubs"), now);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join(cocoon::store::STORAGE_KEY);

    fixture.store().save(&path)?;

    let reloaded = RewardStore::load(&path)?;

    // After reload only the 6% grubs grant is still live.
    assert_eq!(
        reloaded
            .best_for(&ProductId::from("gummy-grubs"), now)
            .map(|r| r.percent().points()),
        Some(6)
    );

    Ok(())
}

#[test]
fn summary_renders_the_storefront_cart() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let cart = fixture.cart(None)?;
    let now = now()?;

    let pricing = cart.evaluate(fixture.store().records(), now)?;
    let summary = CartSummary::new(pricing);

    let mut rendered = Vec::new();

    summary.write_to(&mut rendered, &cart, fixture.products(), fixture.store(), now)?;

    let text = String::from_utf8(rendered)?;

    assert!(text.contains("Gummy Grubs"), "missing product name");
    assert!(text.contains("card-cull"), "missing reward source");
    assert!(text.contains("Total:"), "missing totals block");

    Ok(())
}
