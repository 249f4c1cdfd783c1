//! Fixtures
//!
//! The starter catalog a register is seeded with when its store holds no
//! products. Fixtures are YAML; prices are written as `"AMOUNT CURRENCY"`.

use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    money::{AmountError, parse_price},
    products::{Catalog, Product},
};

/// Bundled starter catalog.
pub const DEFAULT_PRODUCTS: &str = include_str!("../fixtures/products/default.yml");

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price
    #[error("Invalid price for product {0}: {1}")]
    InvalidPrice(String, AmountError),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two products share an identifier
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    /// The fixture lists no products
    #[error("Fixture contains no products")]
    NoProducts,
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Stock keeping unit
    pub sku: String,

    /// Product category
    pub category: String,

    /// Product price (e.g., "95.00 INR")
    pub price: String,

    /// Units on the shelf
    #[serde(default)]
    pub stock: u32,
}

/// A catalog parsed from a fixture, with the currency its prices are in.
#[derive(Debug, Clone)]
pub struct CatalogFixture {
    /// Parsed products
    pub catalog: Catalog,

    /// Currency shared by every price
    pub currency: &'static Currency,
}

/// Parse a products fixture.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price cannot be parsed, prices
/// use more than one currency, an id repeats, or there are no products.
pub fn load_catalog(yaml: &str) -> Result<CatalogFixture, FixtureError> {
    let fixture: ProductsFixture = serde_norway::from_str(yaml)?;

    let mut currency: Option<&'static Currency> = None;
    let mut products: Vec<Product> = Vec::with_capacity(fixture.products.len());

    for product_fixture in fixture.products {
        let (price, product_currency) = parse_price(&product_fixture.price)
            .map_err(|error| FixtureError::InvalidPrice(product_fixture.id.clone(), error))?;

        match currency {
            Some(existing) if existing != product_currency => {
                return Err(FixtureError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    product_currency.iso_alpha_code.to_string(),
                ));
            }
            Some(_) => {}
            None => currency = Some(product_currency),
        }

        if products.iter().any(|product| product.id == product_fixture.id) {
            return Err(FixtureError::DuplicateProduct(product_fixture.id));
        }

        products.push(Product {
            id: product_fixture.id,
            name: product_fixture.name,
            sku: product_fixture.sku,
            category: product_fixture.category,
            price,
            stock: product_fixture.stock,
        });
    }

    let currency = currency.ok_or(FixtureError::NoProducts)?;

    Ok(CatalogFixture {
        catalog: Catalog::new(products),
        currency,
    })
}

/// Parse the bundled starter catalog.
///
/// # Errors
///
/// Returns an error if the bundled fixture is invalid.
pub fn default_catalog() -> Result<CatalogFixture, FixtureError> {
    load_catalog(DEFAULT_PRODUCTS)
}
