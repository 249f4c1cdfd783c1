//! Sales history
//!
//! Filtering recorded sales by payment mode and local calendar date, and
//! splitting the result into pages. Order is always the ledger's own, most
//! recent first.

use std::{fmt, str::FromStr};

use jiff::{ToSpan, civil::Date, tz::TimeZone};
use thiserror::Error;

use crate::sales::{PaymentMode, Sale, UnknownPaymentMode};

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Errors raised while parsing history filters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Not `ALL` and not a payment mode.
    #[error(transparent)]
    Mode(#[from] UnknownPaymentMode),

    /// Not one of `TODAY`, `7D`, `30D` or `ALL`.
    #[error("Unknown date range: {0}")]
    Range(String),
}

/// Payment mode restriction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModeFilter {
    /// Every payment mode
    #[default]
    All,

    /// A single payment mode
    Only(PaymentMode),
}

impl ModeFilter {
    fn matches(self, mode: PaymentMode) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == mode,
        }
    }
}

impl FromStr for ModeFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            return Ok(Self::All);
        }

        Ok(Self::Only(s.parse()?))
    }
}

impl fmt::Display for ModeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Only(mode) => write!(f, "{mode}"),
        }
    }
}

/// Inclusive range of local calendar dates. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First day kept
    pub from: Option<Date>,

    /// Last day kept, in full
    pub to: Option<Date>,
}

impl DateRange {
    /// Range between two days, both included.
    #[must_use]
    pub fn between(from: Date, to: Date) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Check whether a day falls inside the range.
    pub fn contains(&self, day: Date) -> bool {
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }
}

/// Preset date ranges ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    /// Today only
    Today,

    /// Today and the six days before it
    Last7Days,

    /// Today and the 29 days before it
    Last30Days,

    /// No date restriction
    All,
}

impl QuickRange {
    /// The dates covered when today is `today`.
    pub fn range(self, today: Date) -> DateRange {
        let days_back = match self {
            Self::Today => 0,
            Self::Last7Days => 6,
            Self::Last30Days => 29,
            Self::All => return DateRange::default(),
        };

        DateRange::between(today.saturating_sub(days_back.days()), today)
    }
}

impl FromStr for QuickRange {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TODAY" => Ok(Self::Today),
            "7D" => Ok(Self::Last7Days),
            "30D" => Ok(Self::Last30Days),
            "ALL" => Ok(Self::All),
            _ => Err(FilterError::Range(s.to_string())),
        }
    }
}

/// Sales history filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesFilter {
    /// Payment mode restriction
    pub mode: ModeFilter,

    /// Local date restriction
    pub dates: DateRange,
}

impl SalesFilter {
    /// Check whether a sale passes the filter. Dates are read in `tz`.
    pub fn matches(&self, sale: &Sale, tz: &TimeZone) -> bool {
        self.mode.matches(sale.mode) && self.dates.contains(sale.time.to_zoned(tz.clone()).date())
    }

    /// Sales that pass the filter, keeping their order.
    pub fn apply<'a>(&self, sales: &'a [Sale], tz: &TimeZone) -> Vec<&'a Sale> {
        sales.iter().filter(|sale| self.matches(sale, tz)).collect()
    }
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// Page number, starting at 1
    pub number: usize,

    /// Page size the list was split with
    pub size: usize,

    /// Number of pages, at least 1
    pub total_pages: usize,

    /// Length of the whole list
    pub total_items: usize,

    /// Entries on this page; empty past the last page
    pub items: &'a [T],
}

/// Cut `items` into pages of `size` and return page `number`.
///
/// A size of zero is treated as one, as is page zero.
pub fn paginate<T>(items: &[T], number: usize, size: usize) -> Page<'_, T> {
    let size = size.max(1);
    let number = number.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(size).max(1);

    let start = (number - 1).saturating_mul(size).min(total_items);
    let end = start.saturating_add(size).min(total_items);

    Page {
        number,
        size,
        total_pages,
        total_items,
        items: items.get(start..end).unwrap_or_default(),
    }
}
