//! CSV export
//!
//! One row per sale. The header line is bare; every value below it is quoted.
//! Money is written in major units with two decimals.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    string::FromUtf8Error,
};

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{money::minor_to_major, sales::Sale};

/// Column names, in order.
pub const HEADER: [&str; 9] = [
    "id",
    "time",
    "mode",
    "subTotal",
    "discount",
    "taxPercent",
    "tax",
    "net",
    "items",
];

/// File name used when the caller does not pick one.
pub const DEFAULT_FILE_NAME: &str = "payments.csv";

/// Errors raised while writing or reading an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The destination could not be written.
    #[error("Failed to write export: {0}")]
    Io(#[from] io::Error),

    /// The export is not valid UTF-8.
    #[error("Export is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// One exported sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCsvRow {
    /// Bill identifier
    pub id: String,

    /// RFC 3339 timestamp
    pub time: String,

    /// Payment mode code
    pub mode: String,

    /// Sum of line amounts
    #[serde(with = "rust_decimal::serde::str")]
    pub sub_total: Decimal,

    /// Discount applied
    #[serde(with = "rust_decimal::serde::str")]
    pub discount: Decimal,

    /// Tax rate in percent points
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_percent: Decimal,

    /// Tax charged
    #[serde(with = "rust_decimal::serde::str")]
    pub tax: Decimal,

    /// Amount paid
    #[serde(with = "rust_decimal::serde::str")]
    pub net: Decimal,

    /// Line items as `name xQTY @PRICE`, joined by ` | `
    pub items: String,
}

impl From<&Sale> for SaleCsvRow {
    fn from(sale: &Sale) -> Self {
        let items = sale
            .items
            .iter()
            .map(|line| {
                format!(
                    "{} x{} @{}",
                    line.name,
                    line.quantity,
                    minor_to_major(line.price)
                )
            })
            .collect::<Vec<_>>()
            .join(" | ");

        Self {
            id: sale.id.clone(),
            time: sale.time.to_string(),
            mode: sale.mode.to_string(),
            sub_total: minor_to_major(sale.sub_total),
            discount: minor_to_major(sale.discount),
            tax_percent: sale.tax_percent.percent_points(),
            tax: minor_to_major(sale.tax),
            net: minor_to_major(sale.net),
            items,
        }
    }
}

/// Write sales as CSV.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_sales<'a, W: Write>(
    sales: impl IntoIterator<Item = &'a Sale>,
    mut writer: W,
) -> Result<(), ExportError> {
    writeln!(writer, "{}", HEADER.join(","))?;

    let mut csv_writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    let mut rows = 0_usize;

    for sale in sales {
        csv_writer.serialize(SaleCsvRow::from(sale))?;
        rows += 1;
    }

    csv_writer.flush()?;

    debug!(rows, "wrote sales export");

    Ok(())
}

/// Render sales as a CSV string.
///
/// # Errors
///
/// Returns an error if the rows cannot be encoded.
pub fn sales_to_csv<'a>(
    sales: impl IntoIterator<Item = &'a Sale>,
) -> Result<String, ExportError> {
    let mut buffer = Vec::new();

    write_sales(sales, &mut buffer)?;

    Ok(String::from_utf8(buffer)?)
}

/// Write sales to a CSV file, replacing it if it exists.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_to_path<'a>(
    sales: impl IntoIterator<Item = &'a Sale>,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let file = File::create(path.as_ref())?;

    write_sales(sales, BufWriter::new(file))
}

/// Read exported rows back.
///
/// # Errors
///
/// Returns an error if the input is not a sales export.
pub fn read_rows<R: io::Read>(reader: R) -> Result<Vec<SaleCsvRow>, ExportError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let rows = csv_reader
        .deserialize::<SaleCsvRow>()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}
