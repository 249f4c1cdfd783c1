//! Analytics
//!
//! Aggregations over the sales ledger. Every function here is pure and cheap
//! enough to recompute on each request.

use jiff::{ToSpan, civil::Date, tz::TimeZone};
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::sales::{PaymentMode, Sale};

/// Days covered by the daily chart when none is given.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Number of best sellers reported when none is given.
pub const DEFAULT_TOP_PRODUCTS: usize = 7;

/// Points averaged by [`moving_average`].
pub const MOVING_AVERAGE_POINTS: usize = 3;

/// Net sales for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    /// The day
    pub date: Date,

    /// Short `day/month` label, e.g. `7/3`
    pub label: String,

    /// Net sales in minor units
    pub net: i64,
}

/// Net sales for one payment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTotal {
    /// Payment mode
    pub mode: PaymentMode,

    /// Number of sales
    pub count: usize,

    /// Net sales in minor units
    pub net: i64,
}

/// Units sold of one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuantity {
    /// Product name as recorded on the sale
    pub name: String,

    /// Units sold
    pub quantity: u64,
}

/// Count and net total of a set of sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesSummary {
    /// Number of sales
    pub count: usize,

    /// Net total in minor units
    pub net: i64,
}

impl<'a> FromIterator<&'a Sale> for SalesSummary {
    fn from_iter<I: IntoIterator<Item = &'a Sale>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |acc, sale| Self {
            count: acc.count + 1,
            net: acc.net.saturating_add(sale.net),
        })
    }
}

/// Net sales per day over the `days` days ending `today`, oldest first.
///
/// Days without sales are reported as zero. Sale times are read in `tz`.
pub fn daily_totals(sales: &[Sale], days: u32, today: Date, tz: &TimeZone) -> Vec<DailyTotal> {
    let mut by_day: FxHashMap<Date, i64> = FxHashMap::default();

    for sale in sales {
        let day = sale.time.to_zoned(tz.clone()).date();
        let total = by_day.entry(day).or_default();

        *total = total.saturating_add(sale.net);
    }

    (0..days)
        .rev()
        .map(|back| {
            let date = today.saturating_sub(i64::from(back).days());

            DailyTotal {
                date,
                label: format!("{}/{}", date.day(), date.month()),
                net: by_day.get(&date).copied().unwrap_or_default(),
            }
        })
        .collect()
}

/// Trailing simple moving average over up to [`MOVING_AVERAGE_POINTS`] points.
///
/// Point `i` is the mean of the values at `max(0, i - 2)..=i`.
pub fn moving_average(values: &[i64]) -> Vec<Decimal> {
    (0..values.len())
        .map(|idx| {
            let window = values
                .get(idx.saturating_sub(MOVING_AVERAGE_POINTS - 1)..=idx)
                .unwrap_or_default();

            let sum = window.iter().fold(0_i64, |acc, v| acc.saturating_add(*v));

            Decimal::from(sum) / Decimal::from(window.len().max(1))
        })
        .collect()
}

/// Net sales per payment mode, in [`PaymentMode::ALL`] order.
pub fn totals_by_mode(sales: &[Sale]) -> SmallVec<[ModeTotal; 4]> {
    PaymentMode::ALL
        .into_iter()
        .map(|mode| {
            let summary: SalesSummary = sales.iter().filter(|sale| sale.mode == mode).collect();

            ModeTotal {
                mode,
                count: summary.count,
                net: summary.net,
            }
        })
        .collect()
}

/// The `n` products with most units sold, best first.
///
/// Products are grouped by the name recorded on the sale. Ties keep the order
/// in which products first appear in the ledger.
pub fn top_products(sales: &[Sale], n: usize) -> Vec<ProductQuantity> {
    let mut positions: FxHashMap<&str, usize> = FxHashMap::default();
    let mut products: Vec<ProductQuantity> = Vec::new();

    for line in sales.iter().flat_map(|sale| &sale.items) {
        let quantity = u64::from(line.quantity);

        match positions.get(line.name.as_str()) {
            Some(&idx) => {
                if let Some(product) = products.get_mut(idx) {
                    product.quantity = product.quantity.saturating_add(quantity);
                }
            }
            None => {
                positions.insert(&line.name, products.len());
                products.push(ProductQuantity {
                    name: line.name.clone(),
                    quantity,
                });
            }
        }
    }

    products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    products.truncate(n);

    products
}

/// Count and net total of sales made on `today`, read in `tz`.
pub fn today_summary(sales: &[Sale], today: Date, tz: &TimeZone) -> SalesSummary {
    sales
        .iter()
        .filter(|sale| sale.time.to_zoned(tz.clone()).date() == today)
        .collect()
}

/// Everything the analytics view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsReport {
    /// Net sales per day, oldest first
    pub daily: Vec<DailyTotal>,

    /// Moving average of `daily`, one point per day, in minor units
    pub moving_average: Vec<Decimal>,

    /// Net sales per payment mode
    pub by_mode: SmallVec<[ModeTotal; 4]>,

    /// Best sellers by units
    pub top_products: Vec<ProductQuantity>,

    /// Today's sales
    pub today: SalesSummary,
}

impl AnalyticsReport {
    /// Build the report for a window of `days` days ending `today`.
    pub fn build(sales: &[Sale], days: u32, top: usize, today: Date, tz: &TimeZone) -> Self {
        let daily = daily_totals(sales, days, today, tz);
        let nets: Vec<i64> = daily.iter().map(|day| day.net).collect();

        Self {
            moving_average: moving_average(&nets),
            daily,
            by_mode: totals_by_mode(sales),
            top_products: top_products(sales, top),
            today: today_summary(sales, today, tz),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;
    use crate::sales::{SaleLine, tests::sale};

    fn with_items(mut sale: Sale, items: &[(&str, u32)]) -> Sale {
        sale.items = items
            .iter()
            .map(|(name, quantity)| SaleLine {
                product_id: name.to_lowercase(),
                name: (*name).to_string(),
                quantity: *quantity,
                price: 100,
            })
            .collect();
        sale
    }

    #[test]
    fn daily_totals_fill_missing_days_with_zero() -> TestResult {
        let sales = vec![
            sale("c", "2025-03-10T09:00:00Z", PaymentMode::Cash, 300)?,
            sale("b", "2025-03-10T08:00:00Z", PaymentMode::Upi, 200)?,
            sale("a", "2025-03-08T12:00:00Z", PaymentMode::Cash, 100)?,
            sale("old", "2025-02-01T12:00:00Z", PaymentMode::Cash, 999)?,
        ];

        let daily = daily_totals(&sales, 4, date(2025, 3, 10), &TimeZone::UTC);

        let labels: Vec<&str> = daily.iter().map(|d| d.label.as_str()).collect();
        let nets: Vec<i64> = daily.iter().map(|d| d.net).collect();

        assert_eq!(labels, ["7/3", "8/3", "9/3", "10/3"]);
        assert_eq!(nets, [0, 100, 0, 500]);

        Ok(())
    }

    #[test]
    fn daily_totals_cross_month_boundaries() {
        let daily = daily_totals(&[], 3, date(2025, 3, 1), &TimeZone::UTC);

        let labels: Vec<&str> = daily.iter().map(|d| d.label.as_str()).collect();

        assert_eq!(labels, ["27/2", "28/2", "1/3"]);
    }

    #[test]
    fn moving_average_uses_up_to_three_points() {
        let averages = moving_average(&[300, 600, 900, 0]);

        assert_eq!(
            averages,
            [
                Decimal::from(300),
                Decimal::from(450),
                Decimal::from(600),
                Decimal::from(500),
            ]
        );
    }

    #[test]
    fn moving_average_of_nothing_is_empty() {
        assert!(moving_average(&[]).is_empty(), "no points expected");
    }

    #[test]
    fn totals_by_mode_are_in_fixed_order_with_zeros() -> TestResult {
        let sales = vec![
            sale("b", "2025-03-10T08:00:00Z", PaymentMode::Credit, 250)?,
            sale("a", "2025-03-08T12:00:00Z", PaymentMode::Cash, 100)?,
            sale("z", "2025-03-07T12:00:00Z", PaymentMode::Cash, 50)?,
        ];

        let totals = totals_by_mode(&sales);

        let modes: Vec<PaymentMode> = totals.iter().map(|t| t.mode).collect();
        let nets: Vec<i64> = totals.iter().map(|t| t.net).collect();

        assert_eq!(modes, PaymentMode::ALL);
        assert_eq!(nets, [150, 0, 0, 250]);
        assert_eq!(totals.first().map(|t| t.count), Some(2));

        Ok(())
    }

    #[test]
    fn top_products_sorts_by_quantity_keeping_first_seen_ties() -> TestResult {
        let sales = vec![
            with_items(
                sale("b", "2025-03-10T08:00:00Z", PaymentMode::Cash, 0)?,
                &[("Tea", 2), ("Soap", 1)],
            ),
            with_items(
                sale("a", "2025-03-09T08:00:00Z", PaymentMode::Cash, 0)?,
                &[("Rice", 3), ("Tea", 1), ("Dal", 3)],
            ),
        ];

        let top = top_products(&sales, 7);

        let names: Vec<&str> = top.iter().map(|p| p.name.as_str()).collect();
        let quantities: Vec<u64> = top.iter().map(|p| p.quantity).collect();

        assert_eq!(names, ["Tea", "Rice", "Dal", "Soap"]);
        assert_eq!(quantities, [3, 3, 3, 1]);

        let top_two = top_products(&sales, 2);

        assert_eq!(top_two.len(), 2);

        Ok(())
    }

    #[test]
    fn today_summary_counts_only_today() -> TestResult {
        let sales = vec![
            sale("c", "2025-03-10T23:00:00Z", PaymentMode::Cash, 300)?,
            sale("b", "2025-03-10T01:00:00Z", PaymentMode::Upi, 200)?,
            sale("a", "2025-03-09T12:00:00Z", PaymentMode::Cash, 100)?,
        ];

        let summary = today_summary(&sales, date(2025, 3, 10), &TimeZone::UTC);

        assert_eq!(summary, SalesSummary { count: 2, net: 500 });

        Ok(())
    }

    #[test]
    fn report_bundles_every_view() -> TestResult {
        let sales = vec![sale("a", "2025-03-10T08:00:00Z", PaymentMode::Card, 1000)?];

        let report = AnalyticsReport::build(
            &sales,
            DEFAULT_WINDOW_DAYS,
            DEFAULT_TOP_PRODUCTS,
            date(2025, 3, 10),
            &TimeZone::UTC,
        );

        assert_eq!(report.daily.len(), 7);
        assert_eq!(report.moving_average.len(), 7);
        assert_eq!(report.daily.last().map(|d| d.net), Some(1000));
        assert_eq!(report.today.count, 1);
        assert_eq!(report.top_products.len(), 1);

        Ok(())
    }
}
