//! Checkout
//!
//! Turns the open cart into a recorded [`Sale`]. The transition is pure: it
//! takes the current catalog and cart and returns the updated catalog with the
//! new sale, leaving the caller to apply and persist the result.

use jiff::Timestamp;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    cart::Cart,
    money::AmountError,
    pricing::Adjustments,
    products::Catalog,
    sales::{PaymentMode, Sale, SaleLine},
};

/// Errors that prevent a checkout.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// There is nothing to sell.
    #[error("Cannot check out an empty cart")]
    EmptyCart,

    /// Totals could not be computed.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Everything a checkout needs besides the catalog and cart.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// Bill identifier for the new sale
    pub id: String,

    /// Time the sale is recorded at
    pub time: Timestamp,

    /// Payment mode
    pub mode: PaymentMode,

    /// Discount and tax settings
    pub adjustments: Adjustments,

    /// Register currency
    pub currency: &'static Currency,
}

impl CheckoutRequest {
    /// Request stamped with a fresh time-ordered bill identifier and the current time.
    #[must_use]
    pub fn now(mode: PaymentMode, adjustments: Adjustments, currency: &'static Currency) -> Self {
        Self {
            id: new_sale_id(),
            time: Timestamp::now(),
            mode,
            adjustments,
            currency,
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// Catalog with sold quantities taken off the shelf
    pub catalog: Catalog,

    /// The recorded sale
    pub sale: Sale,
}

/// Generate a bill identifier. Identifiers sort by creation time.
pub fn new_sale_id() -> String {
    Uuid::now_v7().to_string()
}

/// Check out the cart.
///
/// Stock of every product in the cart is reduced by the sold quantity, never
/// going below zero. Lines whose product has left the catalog are still sold.
/// The cart itself is not touched; callers clear it once the outcome is applied.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`]: the cart has no lines.
/// - [`CheckoutError::Amount`]: the totals could not be computed.
pub fn checkout(
    catalog: &Catalog,
    cart: &Cart,
    request: CheckoutRequest,
) -> Result<CheckoutOutcome, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let totals = cart.totals(&request.adjustments, request.currency)?;

    let products = catalog
        .iter()
        .map(|product| {
            let mut product = product.clone();
            product.stock = product.stock.saturating_sub(cart.quantity(&product.id));
            product
        })
        .collect::<Vec<_>>();

    let sale = Sale {
        id: request.id,
        time: request.time,
        mode: request.mode,
        items: cart.iter().map(SaleLine::from).collect(),
        sub_total: totals.subtotal.to_minor_units(),
        discount: totals.discount.to_minor_units(),
        tax_percent: totals.tax_rate,
        tax: totals.tax.to_minor_units(),
        net: totals.net.to_minor_units(),
    };

    debug!(sale = %sale.id, lines = sale.items.len(), net = sale.net, "checked out cart");

    Ok(CheckoutOutcome {
        catalog: Catalog::new(products),
        sale,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;
    use crate::{
        pricing::TaxRate,
        products::tests::{product, test_catalog},
    };

    fn request(adjustments: Adjustments) -> Result<CheckoutRequest, jiff::Error> {
        Ok(CheckoutRequest {
            id: "bill-1".to_string(),
            time: "2025-03-01T10:00:00Z".parse()?,
            mode: PaymentMode::Upi,
            adjustments,
            currency: INR,
        })
    }

    #[test]
    fn empty_cart_is_rejected() -> TestResult {
        let result = checkout(&test_catalog(), &Cart::default(), request(Adjustments::default())?);

        assert_eq!(result, Err(CheckoutError::EmptyCart));

        Ok(())
    }

    #[test]
    fn worked_example_produces_expected_sale() -> TestResult {
        let catalog = Catalog::new(vec![product("x", "Misc", 5000, 4)]);
        let mut cart = Cart::default();

        cart.add(catalog.get("x").ok_or("missing x")?)?;
        cart.add(catalog.get("x").ok_or("missing x")?)?;

        let adjustments = Adjustments::new(0, TaxRate::from_percent(5)?);
        let outcome = checkout(&catalog, &cart, request(adjustments)?)?;

        assert_eq!(outcome.sale.sub_total, 10000);
        assert_eq!(outcome.sale.discount, 0);
        assert_eq!(outcome.sale.tax, 500);
        assert_eq!(outcome.sale.net, 10500);
        assert_eq!(outcome.sale.mode, PaymentMode::Upi);
        assert_eq!(outcome.sale.id, "bill-1");
        assert_eq!(outcome.catalog.get("x").map(|p| p.stock), Some(2));

        Ok(())
    }

    #[test]
    fn stock_decreases_by_exactly_the_sold_quantity() -> TestResult {
        let catalog = test_catalog();
        let mut cart = Cart::default();

        cart.add(catalog.get("p1").ok_or("missing p1")?)?;
        cart.add(catalog.get("p1").ok_or("missing p1")?)?;
        cart.add(catalog.get("p4").ok_or("missing p4")?)?;

        let outcome = checkout(&catalog, &cart, request(Adjustments::default())?)?;

        for before in catalog.iter() {
            let after = outcome.catalog.get(&before.id).ok_or("product vanished")?;

            assert_eq!(
                after.stock,
                before.stock - cart.quantity(&before.id),
                "stock mismatch for {}",
                before.id
            );
        }

        Ok(())
    }

    #[test]
    fn stock_never_goes_below_zero() -> TestResult {
        let shelf = Catalog::new(vec![product("x", "Misc", 100, 3)]);
        let mut cart = Cart::default();

        for _ in 0..3 {
            cart.add(shelf.get("x").ok_or("missing x")?)?;
        }

        // The shelf count dropped after the cart was filled.
        let catalog = Catalog::new(vec![product("x", "Misc", 100, 1)]);

        let outcome = checkout(&catalog, &cart, request(Adjustments::default())?)?;

        assert_eq!(outcome.catalog.get("x").map(|p| p.stock), Some(0));

        Ok(())
    }

    #[test]
    fn sale_copies_snapshot_prices_and_clamps_discount() -> TestResult {
        let mut catalog = test_catalog();
        let mut cart = Cart::default();

        cart.add(catalog.get("p1").ok_or("missing p1")?)?;
        catalog.set_price("p1", 1);

        let adjustments = Adjustments::new(1_000_000, TaxRate::from_percent(18)?);
        let outcome = checkout(&catalog, &cart, request(adjustments)?)?;

        assert_eq!(outcome.sale.items.first().map(|l| l.price), Some(9500));
        assert_eq!(outcome.sale.discount, 9500);
        assert_eq!(outcome.sale.net, 0);

        Ok(())
    }

    #[test]
    fn generated_ids_are_unique_and_time_ordered() {
        let first = new_sale_id();
        let second = new_sale_id();

        assert_ne!(first, second, "ids must be unique");
        assert!(first < second, "v7 ids sort by creation time");
    }
}
