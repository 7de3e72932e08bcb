//! Item Fixtures

use serde::Deserialize;

/// Wrapper for cart items in YAML
#[derive(Debug, Deserialize)]
pub struct ItemsFixture {
    /// Vector of line item fixtures
    pub items: Vec<ItemFixture>,
}

/// A single cart line in YAML: a product id reference and a quantity.
#[derive(Debug, Deserialize)]
pub struct ItemFixture {
    /// Product id the line refers to
    pub product: String,

    /// Quantity of the product (defaults to one)
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
