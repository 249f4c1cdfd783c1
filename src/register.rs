//! Register
//!
//! The application state of one till: catalog, open cart, sales ledger and
//! settings, bound to a [`KeyValueStore`]. Every mutation persists the
//! collections it touched.

use jiff::{Timestamp, civil::Date, tz::TimeZone};
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    analytics::{AnalyticsReport, SalesSummary, today_summary},
    cart::{Cart, CartError, CartLine},
    checkout::{CheckoutError, CheckoutRequest, checkout},
    fixtures::{FixtureError, default_catalog},
    history::SalesFilter,
    money::AmountError,
    pricing::{Adjustments, TaxRate, Totals},
    products::{Catalog, CategoryCount, Product, ProductQuery, StockAlerts},
    profile::{Profile, ProfileUpdate},
    receipt::{Receipt, ReceiptError},
    sales::{PaymentMode, Sale, SalesLedger},
    storage::{KeyValueStore, StorageError, keys, load_or_else, save},
};

/// Low-stock threshold used until one is set.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 3;

/// Errors returned by register operations.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Persisted state could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cart change was refused.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Checkout was refused.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Money arithmetic failed.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// The starter catalog could not be loaded.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// A receipt could not be built.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// No product has the identifier.
    #[error("Product {0} not found")]
    UnknownProduct(String),

    /// No sale has the identifier.
    #[error("Sale {0} not found")]
    UnknownSale(String),

    /// Prices cannot be negative.
    #[error("Price cannot be negative: {0}")]
    NegativePrice(i64),
}

/// Application state bound to a store.
#[derive(Debug)]
pub struct Register<S> {
    store: S,
    currency: &'static Currency,
    time_zone: TimeZone,
    catalog: Catalog,
    cart: Cart,
    sales: SalesLedger,
    discount: i64,
    tax_rate: TaxRate,
    low_stock_threshold: u32,
    profile: Profile,
}

impl<S: KeyValueStore> Register<S> {
    /// Load register state from `store`.
    ///
    /// Missing or malformed collections fall back to their defaults. An empty
    /// store is seeded with the starter catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read, or if seeding fails.
    pub fn open(
        mut store: S,
        currency: &'static Currency,
        time_zone: TimeZone,
    ) -> Result<Self, RegisterError> {
        let stored: Option<Catalog> = load_or_else(&store, keys::PRODUCTS, || None)?;

        let catalog = match stored {
            Some(catalog) => catalog,
            None => {
                let fixture = default_catalog()?;

                if fixture.currency != currency {
                    warn!(
                        fixture = fixture.currency.iso_alpha_code,
                        register = currency.iso_alpha_code,
                        "starter catalog prices are in a different currency"
                    );
                }

                save(&mut store, keys::PRODUCTS, &fixture.catalog)?;
                info!(products = fixture.catalog.len(), "seeded starter catalog");

                fixture.catalog
            }
        };

        let register = Self {
            cart: load_or_else(&store, keys::CART, Cart::default)?,
            sales: load_or_else(&store, keys::SALES, SalesLedger::default)?,
            discount: load_or_else(&store, keys::DISCOUNT, || 0_i64)?.max(0),
            tax_rate: load_or_else(&store, keys::TAX, || TaxRate::ZERO)?,
            low_stock_threshold: load_or_else(&store, keys::LOW_STOCK_THRESHOLD, || {
                DEFAULT_LOW_STOCK_THRESHOLD
            })?,
            profile: load_or_else(&store, keys::PROFILE, Profile::default)?,
            catalog,
            store,
            currency,
            time_zone,
        };

        debug!(
            products = register.catalog.len(),
            cart_lines = register.cart.len(),
            sales = register.sales.len(),
            "opened register"
        );

        Ok(register)
    }

    /// Product catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Open cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Recorded sales, most recent first.
    pub fn sales(&self) -> &SalesLedger {
        &self.sales
    }

    /// Current discount and tax settings.
    pub fn adjustments(&self) -> Adjustments {
        Adjustments::new(self.discount, self.tax_rate)
    }

    /// Remaining-stock level at or below which products are flagged.
    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    /// Shop profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Register currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Time zone sale dates are read in.
    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    /// Today's date in the register time zone.
    pub fn today(&self) -> Date {
        Timestamp::now().to_zoned(self.time_zone.clone()).date()
    }

    /// Consume the register, returning its store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Totals of the open cart.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::Amount`] if the totals cannot be computed.
    pub fn totals(&self) -> Result<Totals, RegisterError> {
        Ok(self.cart.totals(&self.adjustments(), self.currency)?)
    }

    /// `All` plus each product category, with counts.
    pub fn categories(&self) -> Vec<CategoryCount> {
        self.catalog.categories()
    }

    /// Products matching `query`.
    pub fn products(&self, query: &ProductQuery) -> Vec<&Product> {
        self.catalog.filter(query, &self.cart, self.low_stock_threshold)
    }

    /// Low-stock and out-of-stock products.
    pub fn stock_alerts(&self) -> StockAlerts<'_> {
        self.catalog.stock_alerts(&self.cart, self.low_stock_threshold)
    }

    fn product(&self, product_id: &str) -> Result<&Product, RegisterError> {
        self.catalog
            .get(product_id)
            .ok_or_else(|| RegisterError::UnknownProduct(product_id.to_string()))
    }

    fn save_cart(&mut self) -> Result<(), RegisterError> {
        save(&mut self.store, keys::CART, &self.cart)?;

        Ok(())
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or has no stock left to reserve.
    pub fn add_to_cart(&mut self, product_id: &str) -> Result<&CartLine, RegisterError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| RegisterError::UnknownProduct(product_id.to_string()))?;

        self.cart.add(product)?;
        self.save_cart()?;

        debug!(product = product_id, "added to cart");

        self.cart_line(product_id)
    }

    /// Add one unit of the product whose SKU or identifier is `code`.
    ///
    /// Returns `Ok(None)` without touching the cart when the code is blank or
    /// matches nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the product has no stock left to reserve.
    pub fn quick_add(&mut self, code: &str) -> Result<Option<&CartLine>, RegisterError> {
        let Some(product_id) = self.catalog.find_by_code(code).map(|p| p.id.clone()) else {
            debug!(code, "quick add matched nothing");

            return Ok(None);
        };

        self.add_to_cart(&product_id).map(Some)
    }

    /// Add one more unit to an existing cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown, not in the cart, or has no stock left.
    pub fn increment(&mut self, product_id: &str) -> Result<&CartLine, RegisterError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(|| RegisterError::UnknownProduct(product_id.to_string()))?;

        self.cart.increment(product)?;
        self.save_cart()?;

        self.cart_line(product_id)
    }

    /// Take one unit off a cart line, removing the line at zero.
    ///
    /// Returns the remaining line, or `None` if it was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn decrement(&mut self, product_id: &str) -> Result<Option<&CartLine>, RegisterError> {
        let removed = self.cart.decrement(product_id)?.is_none();

        self.save_cart()?;

        if removed {
            return Ok(None);
        }

        self.cart_line(product_id).map(Some)
    }

    /// Remove a cart line entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn remove_line(&mut self, product_id: &str) -> Result<CartLine, RegisterError> {
        let line = self
            .cart
            .remove(product_id)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))?;

        self.save_cart()?;

        Ok(line)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn clear_cart(&mut self) -> Result<(), RegisterError> {
        self.cart.clear();
        self.save_cart()
    }

    fn cart_line(&self, product_id: &str) -> Result<&CartLine, RegisterError> {
        self.cart
            .iter()
            .find(|line| line.product_id == product_id)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()).into())
    }

    /// Set the flat discount in minor units. Negative amounts count as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the discount cannot be persisted.
    pub fn set_discount(&mut self, discount: i64) -> Result<(), RegisterError> {
        self.discount = discount.max(0);
        save(&mut self.store, keys::DISCOUNT, &self.discount)?;

        Ok(())
    }

    /// Set the tax rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate cannot be persisted.
    pub fn set_tax_rate(&mut self, tax_rate: TaxRate) -> Result<(), RegisterError> {
        self.tax_rate = tax_rate;
        save(&mut self.store, keys::TAX, &self.tax_rate)?;

        Ok(())
    }

    /// Set the low-stock threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold cannot be persisted.
    pub fn set_low_stock_threshold(&mut self, threshold: u32) -> Result<(), RegisterError> {
        self.low_stock_threshold = threshold;
        save(&mut self.store, keys::LOW_STOCK_THRESHOLD, &threshold)?;

        Ok(())
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be persisted.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<&Profile, RegisterError> {
        update.apply_to(&mut self.profile);
        save(&mut self.store, keys::PROFILE, &self.profile)?;

        Ok(&self.profile)
    }

    /// Change a product's shelf price. Cart lines keep their snapshot price.
    ///
    /// # Errors
    ///
    /// Returns an error if the price is negative, the product is unknown, or the
    /// catalog cannot be persisted.
    pub fn set_price(&mut self, product_id: &str, price: i64) -> Result<&Product, RegisterError> {
        if price < 0 {
            return Err(RegisterError::NegativePrice(price));
        }

        if self.catalog.set_price(product_id, price).is_none() {
            return Err(RegisterError::UnknownProduct(product_id.to_string()));
        }

        save(&mut self.store, keys::PRODUCTS, &self.catalog)?;

        self.product(product_id)
    }

    /// Put more units of a product on the shelf.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the catalog cannot be persisted.
    pub fn restock(&mut self, product_id: &str, quantity: u32) -> Result<&Product, RegisterError> {
        if self.catalog.restock(product_id, quantity).is_none() {
            return Err(RegisterError::UnknownProduct(product_id.to_string()));
        }

        save(&mut self.store, keys::PRODUCTS, &self.catalog)?;

        self.product(product_id)
    }

    /// Check out the cart now with a fresh bill identifier.
    ///
    /// # Errors
    ///
    /// See [`Register::checkout_with`].
    pub fn checkout(&mut self, mode: PaymentMode) -> Result<&Sale, RegisterError> {
        let request = CheckoutRequest::now(mode, self.adjustments(), self.currency);

        self.checkout_with(request)
    }

    /// Check out the cart: take sold units off the shelf, record the sale and
    /// clear the cart.
    ///
    /// Discount and tax come from `request`, not from the register settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, totals cannot be computed, or the
    /// new state cannot be persisted. In-memory state is unchanged on error.
    pub fn checkout_with(&mut self, request: CheckoutRequest) -> Result<&Sale, RegisterError> {
        let outcome = checkout(&self.catalog, &self.cart, request)?;

        let mut sales = self.sales.clone();

        sales.record(outcome.sale);

        // Sales are written first so stock never leaves the shelf without a sale.
        // Memory is only updated once every write has succeeded.
        save(&mut self.store, keys::SALES, &sales)?;
        save(&mut self.store, keys::PRODUCTS, &outcome.catalog)?;
        save(&mut self.store, keys::CART, &Cart::default())?;

        self.catalog = outcome.catalog;
        self.sales = sales;
        self.cart.clear();

        let sale = self
            .sales
            .latest()
            .ok_or(RegisterError::Checkout(CheckoutError::EmptyCart))?;

        info!(
            sale = %sale.id,
            mode = %sale.mode,
            items = sale.item_count(),
            net = sale.net,
            "sale completed"
        );

        Ok(sale)
    }

    /// Sales passing `filter`, most recent first.
    pub fn filtered_sales(&self, filter: &SalesFilter) -> Vec<&Sale> {
        filter.apply(self.sales.as_slice(), &self.time_zone)
    }

    /// Count and net total of today's sales.
    pub fn today_summary(&self) -> SalesSummary {
        today_summary(self.sales.as_slice(), self.today(), &self.time_zone)
    }

    /// Analytics over the `days` days ending today.
    pub fn analytics(&self, days: u32, top: usize) -> AnalyticsReport {
        AnalyticsReport::build(
            self.sales.as_slice(),
            days,
            top,
            self.today(),
            &self.time_zone,
        )
    }

    /// Receipt for a recorded sale.
    ///
    /// # Errors
    ///
    /// Returns [`RegisterError::UnknownSale`] if no sale has the identifier.
    pub fn receipt(&self, sale_id: &str) -> Result<Receipt, RegisterError> {
        let sale = self
            .sales
            .get(sale_id)
            .ok_or_else(|| RegisterError::UnknownSale(sale_id.to_string()))?;

        Ok(Receipt::for_sale(
            sale,
            &self.profile,
            self.currency,
            self.time_zone.clone(),
        ))
    }

    /// Draft receipt for the open cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart totals cannot be computed.
    pub fn draft_receipt(&self, mode: PaymentMode) -> Result<Receipt, RegisterError> {
        Ok(Receipt::draft(
            &self.cart,
            &self.adjustments(),
            mode,
            &self.profile,
            self.currency,
            self.time_zone.clone(),
        )?)
    }
}
