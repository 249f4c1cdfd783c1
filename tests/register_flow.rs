//! End-to-end register flow against a file-backed store.
//!
//! Fills a cart from the starter catalog, checks out on three different days,
//! reopens the register from disk and reads the history back through the
//! filter, pagination and CSV export.

use jiff::{Timestamp, civil::date, tz::TimeZone};
use rusty_money::iso;
use tempfile::tempdir;
use testresult::TestResult;

use till::{
    export::{read_rows, sales_to_csv},
    history::{DateRange, ModeFilter, QuickRange, SalesFilter, paginate},
    prelude::*,
    storage::keys,
};

fn request_at<S: KeyValueStore>(
    register: &Register<S>,
    id: &str,
    time: &str,
    mode: PaymentMode,
) -> Result<CheckoutRequest, jiff::Error> {
    Ok(CheckoutRequest {
        id: id.to_string(),
        time: time.parse::<Timestamp>()?,
        mode,
        adjustments: register.adjustments(),
        currency: register.currency(),
    })
}

#[test]
fn checkout_persists_stock_sales_and_cart() -> TestResult {
    let dir = tempdir()?;

    let mut register = Register::open(FileStore::open(dir.path())?, iso::INR, TimeZone::UTC)?;

    register.add_to_cart("p1")?;
    register.add_to_cart("p1")?;
    register.add_to_cart("p2")?;
    register.set_tax_rate(TaxRate::from_percent(5)?)?;

    let totals = register.totals()?;

    assert_eq!(totals.items, 3);
    assert_eq!(totals.subtotal.to_minor_units(), 33_000);
    assert_eq!(totals.tax.to_minor_units(), 1_650);
    assert_eq!(totals.net.to_minor_units(), 34_650);

    let request = request_at(&register, "bill-1", "2025-03-01T10:00:00Z", PaymentMode::Upi)?;
    let sale = register.checkout_with(request)?;

    assert_eq!(sale.sub_total, 33_000);
    assert_eq!(sale.tax, 1_650);
    assert_eq!(sale.net, 34_650);
    assert_eq!(sale.item_count(), 3);

    let store = register.into_store();

    assert!(
        store.get(keys::SALES)?.is_some_and(|json| json.contains("bill-1")),
        "sales written to disk"
    );

    let reopened = Register::open(FileStore::open(dir.path())?, iso::INR, TimeZone::UTC)?;

    assert!(reopened.cart().is_empty(), "cart cleared on disk");
    assert_eq!(reopened.sales().len(), 1);
    assert_eq!(reopened.catalog().get("p1").ok_or("p1 missing")?.stock, 38);
    assert_eq!(reopened.catalog().get("p2").ok_or("p2 missing")?.stock, 24);
    assert_eq!(reopened.adjustments().tax_rate(), TaxRate::from_percent(5)?);

    let receipt = reopened.receipt("bill-1")?;

    assert!(!receipt.is_draft(), "recorded sale receipt");
    assert_eq!(receipt.sale().net, 34_650);

    Ok(())
}

#[test]
fn history_filters_pages_and_exports() -> TestResult {
    let dir = tempdir()?;

    let mut register = Register::open(FileStore::open(dir.path())?, iso::GBP, TimeZone::UTC)?;

    let days = [
        ("bill-1", "2025-03-01T09:00:00Z", PaymentMode::Cash),
        ("bill-2", "2025-03-02T23:59:59Z", PaymentMode::Card),
        ("bill-3", "2025-03-04T00:00:00Z", PaymentMode::Cash),
    ];

    for (id, time, mode) in days {
        register.add_to_cart("p12")?;

        let request = request_at(&register, id, time, mode)?;

        register.checkout_with(request)?;
    }

    let ids = |sales: &[&Sale]| sales.iter().map(|sale| sale.id.clone()).collect::<Vec<_>>();

    let all = register.filtered_sales(&SalesFilter::default());

    assert_eq!(ids(&all), ["bill-3", "bill-2", "bill-1"]);

    let window = SalesFilter {
        mode: ModeFilter::All,
        dates: DateRange::between(date(2025, 3, 1), date(2025, 3, 2)),
    };

    assert_eq!(ids(&register.filtered_sales(&window)), ["bill-2", "bill-1"]);

    let cash_this_week = SalesFilter {
        mode: ModeFilter::Only(PaymentMode::Cash),
        dates: QuickRange::Last7Days.range(date(2025, 3, 4)),
    };

    assert_eq!(
        ids(&register.filtered_sales(&cash_this_week)),
        ["bill-3", "bill-1"]
    );

    let first = paginate(&all, 1, 2);
    let second = paginate(&all, 2, 2);

    assert_eq!(first.total_pages, 2);
    assert_eq!(ids(first.items), ["bill-3", "bill-2"]);
    assert_eq!(ids(second.items), ["bill-1"]);

    let csv = sales_to_csv(all.iter().copied())?;
    let rows = read_rows(csv.as_bytes())?;

    assert_eq!(rows.len(), 3);

    for (row, sale) in rows.iter().zip(&all) {
        assert_eq!(row, &SaleCsvRow::from(*sale));
    }

    Ok(())
}
