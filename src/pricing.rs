//! Pricing
//!
//! Discount and tax arithmetic for an open order. The discount is a flat amount
//! clamped to the subtotal; tax is a percentage of what remains.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{AmountError, money, percent_of_minor};

/// Errors raised while building a tax rate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxRateError {
    /// Tax rates are percent points and cannot be negative.
    #[error("Tax rate cannot be negative: {0}")]
    Negative(Decimal),

    /// The string is not a decimal number.
    #[error("Invalid tax rate: {0}")]
    Invalid(String),
}

/// Tax rate in percent points (`5` means 5%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// No tax.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Build a tax rate from percent points.
    ///
    /// # Errors
    ///
    /// Returns [`TaxRateError::Negative`] for negative rates.
    pub fn from_percent(points: impl Into<Decimal>) -> Result<Self, TaxRateError> {
        let points = points.into();

        if points.is_sign_negative() && !points.is_zero() {
            return Err(TaxRateError::Negative(points));
        }

        Ok(Self(points.normalize()))
    }

    /// The rate in percent points.
    pub fn percent_points(self) -> Decimal {
        self.0
    }

    /// The rate as a fraction of one.
    pub fn as_percentage(self) -> Percentage {
        Percentage::from(self.0 / Decimal::ONE_HUNDRED)
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = TaxRateError;

    fn try_from(points: Decimal) -> Result<Self, Self::Error> {
        Self::from_percent(points)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

impl FromStr for TaxRate {
    type Err = TaxRateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let points = trimmed
            .strip_suffix('%')
            .unwrap_or(trimmed)
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| TaxRateError::Invalid(s.to_string()))?;

        Self::from_percent(points)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order-level discount and tax settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Adjustments {
    discount: i64,
    tax_rate: TaxRate,
}

impl Adjustments {
    /// Create adjustments. A negative discount counts as no discount.
    #[must_use]
    pub fn new(discount: i64, tax_rate: TaxRate) -> Self {
        Self {
            discount: discount.max(0),
            tax_rate,
        }
    }

    /// Requested flat discount in minor units, before clamping to a subtotal.
    pub fn discount(&self) -> i64 {
        self.discount
    }

    /// Tax rate applied to the discounted amount.
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }
}

/// Totals of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    /// Units across all lines
    pub items: u32,

    /// Sum of line amounts at snapshot prices
    pub subtotal: Money<'static, Currency>,

    /// Discount actually applied, within `[0, subtotal]`
    pub discount: Money<'static, Currency>,

    /// Amount tax is charged on (`subtotal - discount`)
    pub taxable: Money<'static, Currency>,

    /// Tax rate the totals were computed with
    pub tax_rate: TaxRate,

    /// Tax on the taxable amount
    pub tax: Money<'static, Currency>,

    /// Amount to pay (`taxable + tax`)
    pub net: Money<'static, Currency>,
}

impl Totals {
    /// Calculate totals for a subtotal.
    ///
    /// # Errors
    ///
    /// - [`AmountError::PercentConversion`]: the tax does not fit in minor units.
    /// - [`AmountError::Money`]: wrapped money arithmetic error.
    pub fn calculate(
        items: u32,
        subtotal: Money<'static, Currency>,
        adjustments: &Adjustments,
    ) -> Result<Self, AmountError> {
        let currency = subtotal.currency();
        let subtotal_minor = subtotal.to_minor_units();

        let discount = money(
            adjustments.discount().clamp(0, subtotal_minor.max(0)),
            currency,
        );

        let taxable = subtotal.sub(discount)?;

        let tax_minor = percent_of_minor(
            adjustments.tax_rate().as_percentage(),
            taxable.to_minor_units().max(0),
        )?;

        let tax = money(tax_minor, currency);
        let net = taxable.add(tax)?;

        Ok(Self {
            items,
            subtotal,
            discount,
            taxable,
            tax_rate: adjustments.tax_rate(),
            tax,
            net,
        })
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use super::*;

    fn totals(subtotal: i64, discount: i64, rate: TaxRate) -> Result<Totals, AmountError> {
        Totals::calculate(1, money(subtotal, INR), &Adjustments::new(discount, rate))
    }

    #[test]
    fn worked_example_fifty_times_two_at_five_percent() -> TestResult {
        let result = totals(10000, 0, TaxRate::from_percent(5)?)?;

        assert_eq!(result.subtotal.to_minor_units(), 10000);
        assert_eq!(result.discount.to_minor_units(), 0);
        assert_eq!(result.tax.to_minor_units(), 500);
        assert_eq!(result.net.to_minor_units(), 10500);

        Ok(())
    }

    #[test]
    fn discount_is_clamped_to_subtotal() -> TestResult {
        let result = totals(3000, 5000, TaxRate::from_percent(18)?)?;

        assert_eq!(result.discount.to_minor_units(), 3000);
        assert_eq!(result.taxable.to_minor_units(), 0);
        assert_eq!(result.tax.to_minor_units(), 0);
        assert_eq!(result.net.to_minor_units(), 0);

        Ok(())
    }

    #[test]
    fn negative_discount_counts_as_none() -> TestResult {
        let result = totals(3000, -500, TaxRate::ZERO)?;

        assert_eq!(result.discount.to_minor_units(), 0);
        assert_eq!(result.net.to_minor_units(), 3000);

        Ok(())
    }

    #[test]
    fn tax_is_charged_on_discounted_amount() -> TestResult {
        let result = totals(20000, 5000, TaxRate::from_percent(10)?)?;

        assert_eq!(result.taxable.to_minor_units(), 15000);
        assert_eq!(result.tax.to_minor_units(), 1500);
        assert_eq!(result.net.to_minor_units(), 16500);

        Ok(())
    }

    #[test]
    fn net_equals_subtotal_minus_discount_plus_tax() -> TestResult {
        for (subtotal, discount, rate) in [(999, 0, "2.5"), (12345, 345, "18"), (100, 100, "5")] {
            let result = totals(subtotal, discount, rate.parse()?)?;

            assert_eq!(
                result.net.to_minor_units(),
                result.subtotal.to_minor_units() - result.discount.to_minor_units()
                    + result.tax.to_minor_units(),
                "net mismatch for subtotal {subtotal}"
            );
            assert!(result.net.to_minor_units() >= 0, "net must not be negative");
        }

        Ok(())
    }

    #[test]
    fn fractional_rate_rounds_to_minor_unit() -> TestResult {
        // 2.5% of 9.99 is 0.24975
        let result = totals(999, 0, "2.5%".parse()?)?;

        assert_eq!(result.tax.to_minor_units(), 25);

        Ok(())
    }

    #[test]
    fn oversized_rate_is_an_error() -> TestResult {
        let result = totals(10000, 0, TaxRate::from_percent(Decimal::MAX)?);

        assert_eq!(result, Err(AmountError::PercentConversion));

        let result = totals(10000, 0, "79228162514264337593543950335".parse()?);

        assert_eq!(result, Err(AmountError::PercentConversion));

        Ok(())
    }

    #[test]
    fn tax_rate_rejects_negative_and_garbage() {
        assert!(matches!(
            TaxRate::from_percent(-1),
            Err(TaxRateError::Negative(_))
        ));
        assert!(matches!(
            "abc".parse::<TaxRate>(),
            Err(TaxRateError::Invalid(_))
        ));
    }

    #[test]
    fn tax_rate_serializes_as_percent_points() -> TestResult {
        let rate: TaxRate = serde_json::from_str("12.5")?;

        assert_eq!(rate.percent_points(), Decimal::new(125, 1));
        assert_eq!(rate.to_string(), "12.5");

        let negative: Result<TaxRate, _> = serde_json::from_str("-3");

        assert!(negative.is_err(), "negative rates must not deserialize");

        Ok(())
    }
}
