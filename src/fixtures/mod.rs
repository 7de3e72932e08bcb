//! Fixtures
//!
//! YAML-driven test and demo data: product catalogs, cart item lists, and
//! earned-record sets, loaded from `fixtures/{products,items,records}/`.
//! Record fixtures carry fixed timestamps, so tests pass an explicit `now`
//! between `earned_at` and `expires_at` and stay deterministic.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    carts::{Cart, LineItem},
    fixtures::{items::ItemsFixture, products::ProductsFixture, records::RecordsFixture},
    products::{Product, ProductId},
    store::RewardStore,
};

pub mod items;
pub mod products;
pub mod records;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// No items loaded
    #[error("No items loaded; cannot create a cart")]
    NoItems,

    /// Not enough items in fixture
    #[error("Not enough items in fixture, available: {available}, requested: {requested}")]
    NotEnoughItems {
        /// Number of items defined in the fixture
        available: usize,
        /// Number of items requested
        requested: usize,
    },

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] crate::carts::CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Product catalog keyed by product id
    products: FxHashMap<ProductId, Product<'a>>,

    /// Pre-built cart lines (reference products by id)
    items: Vec<LineItem<'a>>,

    /// Pre-built reward store
    store: RewardStore,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            items: Vec::new(),
            store: RewardStore::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (id, product_fixture) in fixture.products {
            // Parse to get currency first (before creating the Product)
            let (_minor_units, currency) = products::parse_price(&product_fixture.price)?;

            // Validate currency consistency
            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let product: Product<'a> = product_fixture.try_into()?;

            self.products.insert(ProductId::new(id), product);
        }

        Ok(self)
    }

    /// Load cart items from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_items(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("items").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ItemsFixture = serde_norway::from_str(&contents)?;

        for item_fixture in fixture.items {
            let id = ProductId::new(item_fixture.product.clone());

            let product = self
                .products
                .get(&id)
                .ok_or_else(|| FixtureError::ProductNotFound(item_fixture.product.clone()))?;

            let item = LineItem::new(id, product.price, item_fixture.quantity);

            self.items.push(item);
        }

        Ok(self)
    }

    /// Load discount records from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a record
    /// references a product that does not exist.
    pub fn load_records(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("records").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: RecordsFixture = serde_norway::from_str(&contents)?;

        for record in fixture.records {
            if !self.products.contains_key(record.product()) {
                return Err(FixtureError::ProductNotFound(
                    record.product().as_str().to_string(),
                ));
            }

            self.store.grant(record);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, items, and records with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_items(name)?
            .load_records(name)?;

        Ok(fixture)
    }

    /// Get a product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product<'a>, FixtureError> {
        self.products
            .get(&ProductId::new(id))
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// Get the product catalog
    pub fn products(&self) -> &FxHashMap<ProductId, Product<'a>> {
        &self.products
    }

    /// Get all pre-built cart lines
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Get the pre-built reward store
    pub fn store(&self) -> &RewardStore {
        &self.store
    }

    /// Get the pre-built reward store, mutably
    pub fn store_mut(&mut self) -> &mut RewardStore {
        &mut self.store
    }

    /// Create a cart from the loaded items
    ///
    /// # Errors
    ///
    /// Returns an error if no items are loaded or if cart creation fails.
    pub fn cart(&self, n: Option<usize>) -> Result<Cart<'a>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        if self.items.is_empty() {
            return Err(FixtureError::NoItems);
        }

        if let Some(n) = n
            && n > self.items.len()
        {
            return Err(FixtureError::NotEnoughItems {
                requested: n,
                available: self.items.len(),
            });
        }

        let items: Vec<LineItem<'_>> = self
            .items
            .iter()
            .take(n.unwrap_or(self.items.len()))
            .cloned()
            .collect();

        Ok(Cart::with_items(items, currency)?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
