//! Cart Demo
//!
//! This demo loads a fixture set, evaluates the cart against the stored
//! rewards, and prints the summary table.
//!
//! Use `-f` to load a fixture set by name
//! Use `-n` to specify the number of items to add to the cart

use std::io;

use anyhow::Result;
use clap::Parser;
use jiff::Timestamp;

use cocoon::{fixtures::Fixture, summary::CartSummary, utils::DemoCartArgs};

pub fn main() -> Result<()> {
    let args = DemoCartArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;
    let cart = fixture.cart(args.n)?;

    let now = Timestamp::now();
    let pricing = cart.evaluate(fixture.store().records(), now)?;
    let summary = CartSummary::new(pricing);

    summary.write_to(
        io::stdout().lock(),
        &cart,
        fixture.products(),
        fixture.store(),
        now,
    )?;

    Ok(())
}
