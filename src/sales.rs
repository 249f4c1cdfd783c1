//! Sales
//!
//! Completed checkouts. A [`Sale`] is immutable once recorded; the
//! [`SalesLedger`] keeps them most recent first.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::CartLine, pricing::TaxRate};

/// Error returned when a payment mode string is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown payment mode: {0}")]
pub struct UnknownPaymentMode(pub String);

/// How a sale was paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMode {
    /// Cash
    #[default]
    Cash,

    /// UPI transfer
    Upi,

    /// Card
    Card,

    /// On credit
    Credit,
}

impl PaymentMode {
    /// Every payment mode, in display order.
    pub const ALL: [Self; 4] = [Self::Cash, Self::Upi, Self::Card, Self::Credit];

    /// Upper-case code, as persisted and exported.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Upi => "UPI",
            Self::Card => "CARD",
            Self::Credit => "CREDIT",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = UnknownPaymentMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPaymentMode(s.to_string()))
    }
}

/// A line item copied into a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    /// Product identifier
    pub product_id: String,

    /// Product name at checkout
    pub name: String,

    /// Units sold
    pub quantity: u32,

    /// Unit price in minor units
    pub price: i64,
}

impl SaleLine {
    /// Line amount in minor units.
    pub fn total(&self) -> i64 {
        self.price.saturating_mul(i64::from(self.quantity))
    }
}

impl From<&CartLine> for SaleLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.price_snapshot,
        }
    }
}

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Bill identifier
    pub id: String,

    /// When the sale was recorded
    pub time: Timestamp,

    /// Payment mode
    pub mode: PaymentMode,

    /// Items sold
    pub items: Vec<SaleLine>,

    /// Sum of line amounts, minor units
    pub sub_total: i64,

    /// Discount applied, minor units
    pub discount: i64,

    /// Tax rate in percent points
    pub tax_percent: TaxRate,

    /// Tax charged, minor units
    pub tax: i64,

    /// Amount paid, minor units
    pub net: i64,
}

impl Sale {
    /// Units across all line items.
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }
}

/// Recorded sales, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesLedger {
    sales: Vec<Sale>,
}

impl SalesLedger {
    /// Record a new sale at the front of the ledger.
    pub fn record(&mut self, sale: Sale) {
        self.sales.insert(0, sale);
    }

    /// Look up a sale by bill identifier.
    pub fn get(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|sale| sale.id == id)
    }

    /// The most recently recorded sale.
    pub fn latest(&self) -> Option<&Sale> {
        self.sales.first()
    }

    /// Iterate over sales, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Sale> {
        self.sales.iter()
    }

    /// Sales as a slice, most recent first.
    pub fn as_slice(&self) -> &[Sale] {
        &self.sales
    }

    /// Get the number of sales.
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    /// Check if no sales have been recorded.
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}
