//! Receipt
//!
//! A printable bill for a recorded sale, or a draft bill for the open cart.
//! Receipts render to a standalone HTML page or to a terminal table.

use std::{
    fmt::Write as _,
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use jiff::{Timestamp, tz::TimeZone};
use rusty_money::iso::Currency;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    checkout::new_sale_id,
    money::{AmountError, format_price},
    pricing::Adjustments,
    profile::Profile,
    sales::{PaymentMode, Sale, SaleLine},
};

const RECEIPT_STYLE: &str = "body{font-family:ui-sans-serif,system-ui,-apple-system,Segoe UI,\
Roboto,Ubuntu;margin:20px;background:#fff} .title{font-weight:700;font-size:18px} \
.muted{color:#666} table{width:100%;border-collapse:collapse;margin-top:10px} \
th,td{text-align:left;padding:6px;border-bottom:1px dashed #ddd} .right{text-align:right} \
.total{font-weight:700;font-size:16px} @media print{button{display:none}}";

const FOOTER: &str = "Thank you! No returns without receipt.";

/// `strftime` pattern for sale times shown to the cashier.
pub const LOCAL_TIME_FORMAT: &str = "%d/%m/%Y, %I:%M:%S %p";

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Draft totals could not be computed.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Failed to write the receipt.
    #[error("Failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// A bill ready to print.
#[derive(Debug, Clone)]
pub struct Receipt {
    profile: Profile,
    sale: Sale,
    draft: bool,
    currency: &'static Currency,
    time_zone: TimeZone,
}

impl Receipt {
    /// Receipt for a recorded sale.
    #[must_use]
    pub fn for_sale(
        sale: &Sale,
        profile: &Profile,
        currency: &'static Currency,
        time_zone: TimeZone,
    ) -> Self {
        Self {
            profile: profile.clone(),
            sale: sale.clone(),
            draft: false,
            currency,
            time_zone,
        }
    }

    /// Draft receipt for the open cart, as it would be billed now.
    ///
    /// The cart may be empty. Nothing is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Amount`] if the cart totals cannot be computed.
    pub fn draft(
        cart: &Cart,
        adjustments: &Adjustments,
        mode: PaymentMode,
        profile: &Profile,
        currency: &'static Currency,
        time_zone: TimeZone,
    ) -> Result<Self, ReceiptError> {
        let totals = cart.totals(adjustments, currency)?;

        let sale = Sale {
            id: new_sale_id(),
            time: Timestamp::now(),
            mode,
            items: cart.iter().map(SaleLine::from).collect(),
            sub_total: totals.subtotal.to_minor_units(),
            discount: totals.discount.to_minor_units(),
            tax_percent: totals.tax_rate,
            tax: totals.tax.to_minor_units(),
            net: totals.net.to_minor_units(),
        };

        Ok(Self {
            profile: profile.clone(),
            sale,
            draft: true,
            currency,
            time_zone,
        })
    }

    /// The sale being billed.
    pub fn sale(&self) -> &Sale {
        &self.sale
    }

    /// Whether this is a draft for an unpaid cart.
    pub fn is_draft(&self) -> bool {
        self.draft
    }

    /// Sale time in the register time zone, e.g. `01/03/2025, 03:30:00 PM`.
    pub fn local_time(&self) -> String {
        self.sale
            .time
            .to_zoned(self.time_zone.clone())
            .strftime(LOCAL_TIME_FORMAT)
            .to_string()
    }

    fn price(&self, minor: i64) -> String {
        format_price(minor, self.currency)
    }

    fn address_line(&self) -> String {
        match self.profile.gstin() {
            Some(gstin) => format!("{} \u{2022} GSTIN: {gstin}", self.profile.address),
            None => self.profile.address.clone(),
        }
    }

    fn bill_line(&self) -> String {
        let draft = if self.draft { " (draft)" } else { "" };

        format!(
            "Bill #{}{draft} \u{2022} {} \u{2022} Mode: {}",
            self.sale.id,
            self.local_time(),
            self.sale.mode
        )
    }

    fn summary_rows(&self) -> [(String, String); 4] {
        [
            ("Sub Total".to_string(), self.price(self.sale.sub_total)),
            (
                "Discount".to_string(),
                format!("-{}", self.price(self.sale.discount)),
            ),
            (
                format!("Tax ({}%)", self.sale.tax_percent),
                self.price(self.sale.tax),
            ),
            ("Net Total".to_string(), self.price(self.sale.net)),
        ]
    }

    /// Print the receipt as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Price", "Amount"]);

        for line in &self.sale.items {
            builder.push_record([
                line.name.clone(),
                line.quantity.to_string(),
                self.price(line.price),
                self.price(line.total()),
            ]);
        }

        let summary_start = self.sale.items.len() + 1;

        for (label, value) in self.summary_rows() {
            builder.push_record([label, String::new(), String::new(), value]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);
        theme.insert_horizontal_line(summary_start, separator);

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..), Alignment::right());
        table.modify(Rows::last(), Color::BOLD);

        writeln!(out, "{} \u{2014} POS", self.profile.shop_name)?;
        writeln!(out, "{}", self.address_line())?;
        writeln!(out, "{}", self.bill_line())?;
        writeln!(out, "{table}")?;
        writeln!(out, "{FOOTER}")?;

        Ok(())
    }
}

/// Renders receipts as standalone HTML pages with a print button.
#[derive(Debug, Clone)]
pub struct HtmlReceiptRenderer<'a> {
    receipt: &'a Receipt,
    output_path: PathBuf,
}

impl<'a> HtmlReceiptRenderer<'a> {
    /// Create a renderer writing to `output_path`.
    pub fn new(output_path: impl Into<PathBuf>, receipt: &'a Receipt) -> Self {
        Self {
            receipt,
            output_path: output_path.into(),
        }
    }

    /// Get the output path.
    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }

    /// Render the receipt to HTML. Every interpolated value is escaped.
    pub fn render(&self) -> String {
        let receipt = self.receipt;
        let mut html = String::new();

        html.push_str("<!doctype html>\n<html><head><meta charset=\"utf-8\" />");
        _ = write!(
            html,
            "<title>Receipt {}</title>\n<style>{RECEIPT_STYLE}</style></head>\n<body>\n",
            escape_html(&receipt.sale.id)
        );
        _ = writeln!(
            html,
            "  <div class=\"title\">{} \u{2014} POS</div>",
            escape_html(&receipt.profile.shop_name)
        );
        _ = writeln!(
            html,
            "  <div class=\"muted\">{}</div>",
            escape_html(&receipt.address_line())
        );
        _ = writeln!(
            html,
            "  <div class=\"muted\">{}</div>",
            escape_html(&receipt.bill_line())
        );

        html.push_str("  <table>\n    <thead><tr><th>Item</th><th>Qty</th>");
        html.push_str("<th class=\"right\">Price</th><th class=\"right\">Amount</th></tr></thead>\n");
        html.push_str("    <tbody>");

        for line in &receipt.sale.items {
            _ = write!(
                html,
                "<tr><td>{}</td><td>{}</td><td class=\"right\">{}</td><td class=\"right\">{}</td></tr>",
                escape_html(&line.name),
                line.quantity,
                escape_html(&receipt.price(line.price)),
                escape_html(&receipt.price(line.total()))
            );
        }

        html.push_str("</tbody>\n    <tfoot>\n");

        for (idx, (label, value)) in receipt.summary_rows().into_iter().enumerate() {
            let class = if idx == 3 { "right total" } else { "right" };

            _ = writeln!(
                html,
                "      <tr><td colspan=\"3\" class=\"{class}\">{}</td><td class=\"{class}\">{}</td></tr>",
                escape_html(&label),
                escape_html(&value)
            );
        }

        html.push_str("    </tfoot>\n  </table>\n");
        _ = writeln!(html, "  <p class=\"muted\">{FOOTER}</p>");
        html.push_str("  <button onclick=\"window.print()\">Print</button>\n</body></html>\n");

        html
    }

    /// Write the rendered receipt to the output file.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Io`] if the file cannot be created or written.
    pub fn write(&self) -> Result<(), ReceiptError> {
        let content = self.render();
        let mut file = File::create(&self.output_path)?;

        file.write_all(content.as_bytes())?;

        Ok(())
    }
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use tempfile::tempdir;
    use testresult::TestResult;

    use super::*;
    use crate::{
        pricing::TaxRate,
        products::tests::test_catalog,
        sales::tests::sale,
    };

    fn recorded() -> Result<Receipt, Box<dyn std::error::Error>> {
        let mut sale = sale("bill-1", "2025-03-01T10:00:00Z", PaymentMode::Card, 10500)?;

        sale.items = vec![SaleLine {
            product_id: "p1".to_string(),
            name: "Chai <Masala>".to_string(),
            quantity: 2,
            price: 5000,
        }];
        sale.sub_total = 10000;
        sale.tax_percent = TaxRate::from_percent(5)?;
        sale.tax = 500;

        let profile = Profile {
            gstin: "29ABCDE1234F1Z5".to_string(),
            ..Profile::default()
        };

        Ok(Receipt::for_sale(&sale, &profile, INR, TimeZone::UTC))
    }

    #[test]
    fn escape_html_replaces_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn html_receipt_has_shop_bill_and_totals() -> TestResult {
        let receipt = recorded()?;
        let html = HtmlReceiptRenderer::new("receipt.html", &receipt).render();

        assert!(html.contains("99 Market \u{2014} POS"), "missing title");
        assert!(html.contains("GSTIN: 29ABCDE1234F1Z5"), "missing gstin");
        assert!(html.contains("Bill #bill-1"), "missing bill id");
        assert!(html.contains("Mode: CARD"), "missing mode");
        assert!(html.contains("01/03/2025, 10:00:00 AM"), "missing local time");
        assert!(html.contains("Chai &lt;Masala&gt;"), "item name not escaped");
        assert!(!html.contains("<Masala>"), "raw markup leaked");
        assert!(html.contains("Tax (5%)"), "missing tax label");
        assert!(html.contains("-₹0.00"), "missing discount");
        assert!(html.contains("₹105.00"), "missing net total");
        assert!(html.contains("window.print()"), "missing print button");

        Ok(())
    }

    #[test]
    fn address_omits_gstin_when_blank() -> TestResult {
        let mut receipt = recorded()?;

        assert!(receipt.address_line().ends_with("GSTIN: 29ABCDE1234F1Z5"), "gstin expected");

        receipt.profile = Profile::default();

        assert_eq!(receipt.address_line(), "Main Road, City, State");

        Ok(())
    }

    #[test]
    fn draft_receipt_uses_cart_totals() -> TestResult {
        let catalog = test_catalog();
        let mut cart = Cart::default();

        cart.add(catalog.get("p1").ok_or("missing p1")?)?;
        cart.add(catalog.get("p1").ok_or("missing p1")?)?;

        let adjustments = Adjustments::new(1000, TaxRate::from_percent(10)?);
        let receipt = Receipt::draft(
            &cart,
            &adjustments,
            PaymentMode::Cash,
            &Profile::default(),
            INR,
            TimeZone::UTC,
        )?;

        assert!(receipt.is_draft(), "draft expected");
        assert_eq!(receipt.sale().sub_total, 19000);
        assert_eq!(receipt.sale().discount, 1000);
        assert_eq!(receipt.sale().tax, 1800);
        assert_eq!(receipt.sale().net, 19800);

        let empty = Receipt::draft(
            &Cart::default(),
            &adjustments,
            PaymentMode::Cash,
            &Profile::default(),
            INR,
            TimeZone::UTC,
        )?;

        assert!(empty.sale().items.is_empty(), "empty cart drafts have no lines");
        assert_eq!(empty.sale().net, 0);

        Ok(())
    }

    #[test]
    fn html_receipt_is_written_to_file() -> TestResult {
        let receipt = recorded()?;
        let dir = tempdir()?;
        let renderer = HtmlReceiptRenderer::new(dir.path().join("bill.html"), &receipt);

        renderer.write()?;

        let written = std::fs::read_to_string(renderer.output_path())?;

        assert_eq!(written, renderer.render());

        Ok(())
    }

    #[test]
    fn terminal_receipt_lists_lines_and_totals() -> TestResult {
        let receipt = recorded()?;
        let mut out = Vec::new();

        receipt.write_to(&mut out)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Chai <Masala>"), "missing item");
        assert!(text.contains("Net Total"), "missing net label");
        assert!(text.contains("₹105.00"), "missing net total");
        assert!(text.contains(FOOTER), "missing footer");

        Ok(())
    }
}
