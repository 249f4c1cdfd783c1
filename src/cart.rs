//! Cart

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    money::{AmountError, sum_minor},
    pricing::{Adjustments, Totals},
    products::Product,
};

/// Errors related to cart changes. The cart is left untouched when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Every remaining unit of the product is already in the cart.
    #[error("Product {0} is out of stock")]
    OutOfStock(String),

    /// The product is not in the catalog.
    #[error("Product {0} not found")]
    UnknownProduct(String),

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),
}

/// One product in the open order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Identifier of the product this line sells
    pub product_id: String,

    /// Product name at the time the line was created
    pub name: String,

    /// Units in the cart
    pub quantity: u32,

    /// Unit price in minor units, captured when the line was created
    pub price_snapshot: i64,
}

impl CartLine {
    fn new(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity: 1,
            price_snapshot: product.price,
        }
    }

    /// Line amount in minor units (`quantity * price_snapshot`).
    pub fn total(&self) -> i64 {
        self.price_snapshot.saturating_mul(i64::from(self.quantity))
    }
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create a cart with the given lines.
    #[must_use]
    pub fn with_lines(lines: impl Into<Vec<CartLine>>) -> Self {
        Self {
            lines: lines.into(),
        }
    }

    /// Units of a product already reserved by the cart.
    pub fn reserved(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.product_id == product_id)
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Units of a product still available to add, never below zero.
    pub fn remaining_stock(&self, product: &Product) -> u32 {
        product.stock.saturating_sub(self.reserved(&product.id))
    }

    /// Add one unit of a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] if no stock remains once the cart is accounted for.
    pub fn add(&mut self, product: &Product) -> Result<&CartLine, CartError> {
        self.ensure_available(product)?;

        let idx = match self.position(&product.id) {
            Some(idx) => {
                self.bump(idx, product)?;
                idx
            }
            None => {
                self.lines.push(CartLine::new(product));
                self.lines.len() - 1
            }
        };

        self.line_at(idx, &product.id)
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`]: no stock remains once the cart is accounted for.
    /// - [`CartError::LineNotFound`]: the product has no line in the cart.
    pub fn increment(&mut self, product: &Product) -> Result<&CartLine, CartError> {
        self.ensure_available(product)?;

        let idx = self
            .position(&product.id)
            .ok_or_else(|| CartError::LineNotFound(product.id.clone()))?;

        self.bump(idx, product)?;

        self.line_at(idx, &product.id)
    }

    /// Take one unit off a line, dropping the line when it reaches zero.
    ///
    /// Returns the updated line, or `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the product has no line in the cart.
    pub fn decrement(&mut self, product_id: &str) -> Result<Option<&CartLine>, CartError> {
        let idx = self
            .position(product_id)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))?;

        if self.lines.get(idx).is_some_and(|line| line.quantity <= 1) {
            self.lines.remove(idx);
            return Ok(None);
        }

        let line = self
            .lines
            .get_mut(idx)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))?;

        line.quantity -= 1;

        Ok(Some(&*line))
    }

    /// Drop a product's line entirely.
    pub fn remove(&mut self, product_id: &str) -> Option<CartLine> {
        let idx = self.position(product_id)?;

        Some(self.lines.remove(idx))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Quantity of a product in the cart.
    pub fn quantity(&self, product_id: &str) -> u32 {
        self.reserved(product_id)
    }

    /// Iterate over the lines in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// The lines in the order they were added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Calculate the subtotal of the cart at snapshot prices.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] if there was a money arithmetic error.
    pub fn subtotal(
        &self,
        currency: &'static Currency,
    ) -> Result<Money<'static, Currency>, AmountError> {
        sum_minor(self.lines.iter().map(CartLine::total), currency)
    }

    /// Calculate the cart totals after discount and tax.
    ///
    /// # Errors
    ///
    /// Returns an [`AmountError`] if there was a money arithmetic error.
    pub fn totals(
        &self,
        adjustments: &Adjustments,
        currency: &'static Currency,
    ) -> Result<Totals, AmountError> {
        Totals::calculate(self.item_count(), self.subtotal(currency)?, adjustments)
    }

    fn ensure_available(&self, product: &Product) -> Result<(), CartError> {
        if self.remaining_stock(product) == 0 {
            return Err(CartError::OutOfStock(product.id.clone()));
        }

        Ok(())
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
    }

    fn bump(&mut self, idx: usize, product: &Product) -> Result<(), CartError> {
        let line = self
            .lines
            .get_mut(idx)
            .ok_or_else(|| CartError::LineNotFound(product.id.clone()))?;

        line.quantity = line.quantity.saturating_add(1);

        Ok(())
    }

    fn line_at(&self, idx: usize, product_id: &str) -> Result<&CartLine, CartError> {
        self.lines
            .get(idx)
            .ok_or_else(|| CartError::LineNotFound(product_id.to_string()))
    }
}
