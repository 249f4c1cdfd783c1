//! Money
//!
//! Amounts are carried as integer minor units (paise, pence, cents) of a single
//! register currency. `rusty-money` supplies the currency table and checked
//! arithmetic; `rust_decimal` handles conversion to and from major units.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{Currency, EUR, GBP, INR, USD},
};
use thiserror::Error;

/// Number of minor digits shared by every supported currency.
pub const MINOR_DIGITS: u32 = 2;

/// Errors raised while parsing or converting amounts.
#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    /// The amount string could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The currency code is not one the register supports.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A percentage calculation could not be represented in minor units.
    #[error("percentage conversion overflowed")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Resolve a supported ISO currency code.
///
/// # Errors
///
/// Returns [`AmountError::UnknownCurrency`] for codes other than INR, GBP, USD and EUR.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, AmountError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "INR" => Ok(INR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(AmountError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a major-unit amount (e.g. `"49.50"`) into minor units.
///
/// # Errors
///
/// Returns [`AmountError::InvalidAmount`] if the string is not a decimal number
/// or does not fit in minor units.
pub fn parse_amount(s: &str) -> Result<i64, AmountError> {
    let amount = s
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| AmountError::InvalidAmount(s.to_string()))?;

    major_to_minor(amount).ok_or_else(|| AmountError::InvalidAmount(s.to_string()))
}

/// Parse a price string (e.g. `"45.00 INR"`) into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the
/// amount cannot be parsed, or if the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), AmountError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AmountError::InvalidAmount(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    Ok((parse_amount(amount)?, currency_from_code(code)?))
}

/// Convert a major-unit decimal into minor units, rounding half away from zero.
pub fn major_to_minor(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Major-unit decimal for a minor-unit amount, always with two decimal places.
pub fn minor_to_major(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_DIGITS)
}

/// Wrap minor units in a [`Money`] value of the given currency.
pub fn money(minor: i64, currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_minor(minor, currency)
}

/// Sum minor-unit amounts with currency-checked money arithmetic.
///
/// # Errors
///
/// Returns [`AmountError::Money`] if the money arithmetic fails.
pub fn sum_minor(
    amounts: impl IntoIterator<Item = i64>,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, AmountError> {
    let total = amounts
        .into_iter()
        .try_fold(money(0, currency), |acc, minor| acc.add(money(minor, currency)))?;

    Ok(total)
}

/// Apply a fractional percentage to a minor-unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`AmountError::PercentConversion`] if the result does not fit in minor units.
pub fn percent_of_minor(percent: Percentage, minor: i64) -> Result<i64, AmountError> {
    let fraction = percent * Decimal::ONE;

    fraction
        .checked_mul(Decimal::from(minor))
        .ok_or(AmountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(AmountError::PercentConversion)
}

/// Format minor units for display, e.g. `10500` paise as `₹105.00`.
pub fn format_price(minor_units: i64, currency: &Currency) -> String {
    let abs_minor = minor_units.unsigned_abs();
    let major_units = abs_minor / 100;
    let fractional = abs_minor % 100;
    let sign = if minor_units < 0 { "-" } else { "" };
    let symbol = match currency.iso_alpha_code {
        "INR" => "₹",
        "GBP" => "£",
        "USD" => "$",
        "EUR" => "€",
        _ => "",
    };

    if symbol.is_empty() {
        format!("{sign}{major_units}.{fractional:02} {}", currency.iso_alpha_code)
    } else {
        format!("{sign}{symbol}{major_units}.{fractional:02}")
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_reads_amount_and_currency() -> TestResult {
        let (minor, currency) = parse_price("45.50 INR")?;

        assert_eq!(minor, 4550);
        assert_eq!(currency, INR);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99INR");

        assert!(matches!(result, Err(AmountError::InvalidAmount(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(AmountError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_amount_rounds_to_minor_units() -> TestResult {
        assert_eq!(parse_amount("10")?, 1000);
        assert_eq!(parse_amount(" 0.005 ")?, 1);
        assert_eq!(parse_amount("12.34")?, 1234);

        Ok(())
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("ten"),
            Err(AmountError::InvalidAmount(_))
        ));
    }

    #[test]
    fn minor_to_major_keeps_two_decimals() {
        assert_eq!(minor_to_major(10500).to_string(), "105.00");
        assert_eq!(minor_to_major(5).to_string(), "0.05");
    }

    #[test]
    fn sum_minor_adds_amounts() -> TestResult {
        let total = sum_minor([100, 250, 50], INR)?;

        assert_eq!(total.to_minor_units(), 400);

        Ok(())
    }

    #[test]
    fn sum_minor_of_nothing_is_zero() -> TestResult {
        assert_eq!(sum_minor([], GBP)?.to_minor_units(), 0);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        let percent = Percentage::from(Decimal::new(5, 2));

        assert_eq!(percent_of_minor(percent, 10000)?, 500);

        let percent = Percentage::from(Decimal::new(5, 2));

        // 5% of 1.10 is 0.055
        assert_eq!(percent_of_minor(percent, 110)?, 6);

        Ok(())
    }

    #[test]
    fn percent_of_minor_reports_overflow() {
        let percent = Percentage::from(Decimal::MAX);

        assert_eq!(
            percent_of_minor(percent, 10000),
            Err(AmountError::PercentConversion)
        );
        assert_eq!(
            percent_of_minor(Percentage::from(Decimal::from(i64::MAX)), i64::MAX),
            Err(AmountError::PercentConversion)
        );
    }

    #[test]
    fn format_price_uses_currency_symbol() {
        assert_eq!(format_price(10500, INR), "₹105.00");
        assert_eq!(format_price(1250, GBP), "£12.50");
        assert_eq!(format_price(-1250, USD), "-$12.50");
        assert_eq!(format_price(1, EUR), "€0.01");
    }

    #[test]
    fn currency_from_code_is_case_insensitive() -> TestResult {
        assert_eq!(currency_from_code("inr")?, INR);
        assert_eq!(currency_from_code(" usd ")?, USD);

        Ok(())
    }
}
