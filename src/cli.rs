//! Command line front end
//!
//! Each command loads the register, applies one change or renders one view,
//! and exits. All rules live in [`Register`].

use std::{
    io::Write,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use jiff::civil::Date;
use rust_decimal::prelude::ToPrimitive;
use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;
use tracing::debug;

use crate::{
    analytics::{DEFAULT_TOP_PRODUCTS, DEFAULT_WINDOW_DAYS},
    cart::CartError,
    config::{Config, ConfigError},
    export::{DEFAULT_FILE_NAME, ExportError, export_to_path},
    history::{DEFAULT_PAGE_SIZE, DateRange, ModeFilter, QuickRange, SalesFilter, paginate},
    money::{AmountError, format_price, parse_amount},
    pricing::TaxRate,
    products::{ALL_CATEGORIES, Product, ProductQuery},
    profile::ProfileUpdate,
    receipt::{HtmlReceiptRenderer, LOCAL_TIME_FORMAT, Receipt, ReceiptError},
    register::{Register, RegisterError},
    sales::PaymentMode,
    storage::{FileStore, KeyValueStore, StorageError},
};

/// Errors reported by the command line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The data directory could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A register operation failed.
    #[error(transparent)]
    Register(#[from] RegisterError),

    /// The export could not be written.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The receipt could not be written.
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// An amount argument could not be parsed.
    #[error(transparent)]
    Amount(#[from] AmountError),

    /// Writing to the terminal failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Till point-of-sale register
#[derive(Debug, Parser)]
#[command(name = "till", about = "Till point-of-sale register", long_about = None)]
pub struct Cli {
    /// Register settings.
    #[command(flatten)]
    pub config: Config,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load arguments, reading a `.env` file first if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed.
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List products
    Products(ProductsArgs),

    /// List categories with product counts
    Categories,

    /// Show low-stock and out-of-stock products
    Alerts,

    /// Work with the open cart
    Cart(CartCommand),

    /// Change discount, tax rate or low-stock threshold
    Adjust(AdjustArgs),

    /// Take payment for the open cart
    Checkout(CheckoutArgs),

    /// Print a receipt for a sale, or a draft for the open cart
    Receipt(ReceiptArgs),

    /// Browse sales history
    Sales(SalesArgs),

    /// Export sales as CSV
    Export(ExportArgs),

    /// Show sales analytics
    Analytics(AnalyticsArgs),

    /// Show today's sales count and total
    Today,

    /// Show or edit the shop profile
    Profile(ProfileCommand),

    /// Edit a product
    Product(ProductCommand),
}

/// `products` arguments.
#[derive(Debug, Clone, Args)]
pub struct ProductsArgs {
    /// Text matched against name, SKU and category
    #[arg(long, short, default_value = "")]
    pub search: String,

    /// Category to list
    #[arg(long, short, default_value = ALL_CATEGORIES)]
    pub category: String,

    /// Only list products at or below the low-stock threshold
    #[arg(long)]
    pub low_stock: bool,
}

/// `cart` arguments.
#[derive(Debug, Args)]
pub struct CartCommand {
    /// Cart action; shows the cart when omitted
    #[command(subcommand)]
    pub command: Option<CartSubcommand>,
}

/// Cart actions.
#[derive(Debug, Subcommand)]
pub enum CartSubcommand {
    /// Show cart lines and totals
    Show,

    /// Add one unit of a product
    Add {
        /// Product identifier
        product_id: String,
    },

    /// Add one unit by SKU or product identifier
    QuickAdd {
        /// SKU or product identifier
        code: String,
    },

    /// Add one more unit to a cart line
    Inc {
        /// Product identifier
        product_id: String,
    },

    /// Take one unit off a cart line
    Dec {
        /// Product identifier
        product_id: String,
    },

    /// Remove a cart line
    Remove {
        /// Product identifier
        product_id: String,
    },

    /// Empty the cart
    Clear,
}

/// `adjust` arguments.
#[derive(Debug, Clone, Args)]
pub struct AdjustArgs {
    /// Flat discount in major units, e.g. `25.50`
    #[arg(long)]
    pub discount: Option<String>,

    /// Tax rate in percent, e.g. `5` or `12.5%`
    #[arg(long)]
    pub tax: Option<TaxRate>,

    /// Remaining-stock level at or below which products are flagged
    #[arg(long)]
    pub low_stock_threshold: Option<u32>,
}

/// `checkout` arguments.
#[derive(Debug, Clone, Args)]
pub struct CheckoutArgs {
    /// Payment mode (CASH, UPI, CARD, CREDIT)
    #[arg(long, short, default_value = "CASH")]
    pub mode: PaymentMode,

    /// Also write the receipt as HTML to this path
    #[arg(long)]
    pub html: Option<PathBuf>,
}

/// `receipt` arguments.
#[derive(Debug, Clone, Args)]
pub struct ReceiptArgs {
    /// Bill identifier; drafts a receipt for the open cart when omitted
    pub sale_id: Option<String>,

    /// Payment mode shown on a draft receipt
    #[arg(long, short, default_value = "CASH")]
    pub mode: PaymentMode,

    /// Write the receipt as HTML to this path instead of the terminal
    #[arg(long)]
    pub html: Option<PathBuf>,
}

/// Sales history filter arguments.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Payment mode (ALL, CASH, UPI, CARD, CREDIT)
    #[arg(long, short, default_value = "ALL")]
    pub mode: ModeFilter,

    /// Preset range (TODAY, 7D, 30D, ALL); --from and --to override its ends
    #[arg(long, short)]
    pub range: Option<QuickRange>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<Date>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<Date>,
}

impl FilterArgs {
    /// Build the sales filter for `today`.
    pub fn filter(&self, today: Date) -> SalesFilter {
        let preset = self
            .range
            .map_or_else(DateRange::default, |range| range.range(today));

        SalesFilter {
            mode: self.mode,
            dates: DateRange {
                from: self.from.or(preset.from),
                to: self.to.or(preset.to),
            },
        }
    }
}

/// `sales` arguments.
#[derive(Debug, Clone, Args)]
pub struct SalesArgs {
    /// Filter settings.
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Page number, starting at 1
    #[arg(long, short, default_value_t = 1)]
    pub page: usize,

    /// Sales per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

/// `export` arguments.
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Filter settings.
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Destination file
    #[arg(long, short, default_value = DEFAULT_FILE_NAME)]
    pub output: PathBuf,
}

/// `analytics` arguments.
#[derive(Debug, Clone, Args)]
pub struct AnalyticsArgs {
    /// Days in the trend window
    #[arg(long, short, default_value_t = DEFAULT_WINDOW_DAYS)]
    pub days: u32,

    /// Number of best sellers to list
    #[arg(long, short, default_value_t = DEFAULT_TOP_PRODUCTS)]
    pub top: usize,
}

/// `profile` arguments.
#[derive(Debug, Args)]
pub struct ProfileCommand {
    /// Profile action; shows the profile when omitted
    #[command(subcommand)]
    pub command: Option<ProfileSubcommand>,
}

/// Profile actions.
#[derive(Debug, Subcommand)]
pub enum ProfileSubcommand {
    /// Show the shop profile
    Show,

    /// Change profile fields
    Set(ProfileSetArgs),
}

/// `profile set` arguments.
#[derive(Debug, Clone, Args)]
pub struct ProfileSetArgs {
    /// Shop name
    #[arg(long)]
    pub shop_name: Option<String>,

    /// Owner name
    #[arg(long)]
    pub owner: Option<String>,

    /// Contact phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// GST identification number; pass an empty string to clear it
    #[arg(long)]
    pub gstin: Option<String>,

    /// Postal address
    #[arg(long)]
    pub address: Option<String>,

    /// Opening hours
    #[arg(long)]
    pub hours: Option<String>,

    /// Avatar image URL
    #[arg(long)]
    pub avatar: Option<String>,
}

impl From<ProfileSetArgs> for ProfileUpdate {
    fn from(args: ProfileSetArgs) -> Self {
        Self {
            shop_name: args.shop_name,
            owner: args.owner,
            phone: args.phone,
            gstin: args.gstin,
            address: args.address,
            hours: args.hours,
            avatar: args.avatar,
        }
    }
}

/// `product` arguments.
#[derive(Debug, Args)]
pub struct ProductCommand {
    /// Product action
    #[command(subcommand)]
    pub command: ProductSubcommand,
}

/// Product actions.
#[derive(Debug, Subcommand)]
pub enum ProductSubcommand {
    /// Change a product's shelf price
    Price {
        /// Product identifier
        product_id: String,

        /// New price in major units, e.g. `99.50`
        price: String,
    },

    /// Put more units on the shelf
    Restock {
        /// Product identifier
        product_id: String,

        /// Units to add
        quantity: u32,
    },
}

/// Open the register in the configured data directory and run the command.
///
/// # Errors
///
/// Returns a [`CliError`] if configuration is invalid, the register cannot be
/// opened, or the command fails.
pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<(), CliError> {
    let currency = cli.config.currency()?;
    let time_zone = cli.config.time_zone()?;
    let store = FileStore::open(&cli.config.data_dir)?;

    debug!(data_dir = %cli.config.data_dir.display(), "opening register");

    let mut register = Register::open(store, currency, time_zone)?;

    execute(&mut register, cli.command, &cli.config, out)
}

/// Run one command against an open register.
///
/// # Errors
///
/// Returns a [`CliError`] if the command fails or output cannot be written.
pub fn execute<S: KeyValueStore, W: Write>(
    register: &mut Register<S>,
    command: Commands,
    config: &Config,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        Commands::Products(args) => list_products(register, &args, out),
        Commands::Categories => list_categories(register, out),
        Commands::Alerts => show_alerts(register, out),
        Commands::Cart(CartCommand { command }) => {
            cart(register, command.unwrap_or(CartSubcommand::Show), out)
        }
        Commands::Adjust(args) => adjust(register, &args, out),
        Commands::Checkout(args) => checkout(register, &args, config, out),
        Commands::Receipt(args) => receipt(register, &args, out),
        Commands::Sales(args) => list_sales(register, &args, out),
        Commands::Export(args) => export(register, &args, out),
        Commands::Analytics(args) => analytics(register, &args, out),
        Commands::Today => today(register, out),
        Commands::Profile(ProfileCommand { command }) => {
            profile(register, command.unwrap_or(ProfileSubcommand::Show), out)
        }
        Commands::Product(ProductCommand { command }) => product(register, command, out),
    }
}

fn styled(builder: Builder) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);

    table
}

fn product_table<S: KeyValueStore>(register: &Register<S>, products: &[&Product]) -> Table {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "SKU", "Category", "Price", "Left"]);

    for product in products {
        builder.push_record([
            product.id.clone(),
            product.name.clone(),
            product.sku.clone(),
            product.category.clone(),
            format_price(product.price, register.currency()),
            register.cart().remaining_stock(product).to_string(),
        ]);
    }

    let mut table = styled(builder);

    table.modify(Columns::new(4..), Alignment::right());

    table
}

fn list_products<S: KeyValueStore, W: Write>(
    register: &Register<S>,
    args: &ProductsArgs,
    out: &mut W,
) -> Result<(), CliError> {
    let query = ProductQuery {
        search: args.search.clone(),
        low_stock_only: args.low_stock,
        ..ProductQuery::default()
    }
    .in_category(args.category.clone());

    let products = register.products(&query);

    if products.is_empty() {
        writeln!(out, "No products match.")?;

        return Ok(());
    }

    writeln!(out, "{}", product_table(register, &products))?;

    Ok(())
}

fn list_categories<S: KeyValueStore, W: Write>(
    register: &Register<S>,
    out: &mut W,
) -> Result<(), CliError> {
    let mut builder = Builder::default();

    builder.push_record(["Category", "Products"]);

    for category in register.categories() {
        builder.push_record([category.name, category.count.to_string()]);
    }

    let mut table = styled(builder);

    table.modify(Columns::new(1..), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

fn show_alerts<S: KeyValueStore, W: Write>(
    register: &Register<S>,
    out: &mut W,
) -> Result<(), CliError> {
    let alerts = register.stock_alerts();

    writeln!(
        out,
        "Low stock (at or below {}): {}",
        register.low_stock_threshold(),
        alerts.low.len()
    )?;

    if !alerts.low.is_empty() {
        writeln!(out, "{}", product_table(register, &alerts.low))?;
    }

    writeln!(out, "Out of stock: {}", alerts.out.len())?;

    if !alerts.out.is_empty() {
        writeln!(out, "{}", product_table(register, &alerts.out))?;
    }

    Ok(())
}

fn cart<S: KeyValueStore, W: Write>(
    register: &mut Register<S>,
    command: CartSubcommand,
    out: &mut W,
) -> Result<(), CliError> {
    match command {
        CartSubcommand::Show => {}
        CartSubcommand::Add { product_id } => match register.add_to_cart(&product_id) {
            Ok(line) => writeln!(out, "Added {} (qty {})", line.name, line.quantity)?,
            Err(RegisterError::Cart(CartError::OutOfStock(id))) => out_of_stock(&id, out)?,
            Err(error) => return Err(error.into()),
        },
        CartSubcommand::QuickAdd { code } => match register.quick_add(&code) {
            Ok(Some(line)) => writeln!(out, "Added {} (qty {})", line.name, line.quantity)?,
            Ok(None) => writeln!(out, "No product matches {code:?}")?,
            Err(RegisterError::Cart(CartError::OutOfStock(id))) => out_of_stock(&id, out)?,
            Err(error) => return Err(error.into()),
        },
        CartSubcommand::Inc { product_id } => match register.increment(&product_id) {
            Ok(line) => writeln!(out, "{} qty {}", line.name, line.quantity)?,
            Err(RegisterError::Cart(CartError::OutOfStock(id))) => out_of_stock(&id, out)?,
            Err(error) => return Err(error.into()),
        },
        CartSubcommand::Dec { product_id } => match register.decrement(&product_id)? {
            Some(line) => writeln!(out, "{} qty {}", line.name, line.quantity)?,
            None => writeln!(out, "Removed {product_id} from the cart")?,
        },
        CartSubcommand::Remove { product_id } => {
            let line = register.remove_line(&product_id)?;

            writeln!(out, "Removed {} from the cart", line.name)?;
        }
        CartSubcommand::Clear => {
            register.clear_cart()?;

            writeln!(out, "Cart cleared")?;

            return Ok(());
        }
    }

    show_cart(register, out)
}

fn out_of_stock<W: Write>(product_id: &str, out: &mut W) -> Result<(), CliError> {
    writeln!(out, "No stock left for {product_id}, cart unchanged")?;

    Ok(())
}

fn show_cart<S: KeyValueStore, W: Write>(
    register: &Register<S>,
    out: &mut W,
) -> Result<(), CliError> {
    if register.cart().is_empty() {
        writeln!(out, "Cart is empty.")?;

        return Ok(());
    }

    let currency = register.currency();
    let totals = register.totals()?;
    let mut builder = Builder::default();

    builder.push_record(["ID", "Item", "Qty", "Price", "Amount"]);

    for line in register.cart().iter() {
        builder.push_record([
            line.product_id.clone(),
            line.name.clone(),
            line.quantity.to_string(),
            format_price(line.price_snapshot, currency),
            format_price(line.total(), currency),
        ]);
    }

    let mut table = styled(builder);

    table.modify(Columns::new(2..), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, "Items: {}", totals.items)?;
    writeln!(
        out,
        "Sub Total: {}",
        format_price(totals.subtotal.to_minor_units(), currency)
    )?;
    writeln!(
        out,
        "Discount: -{}",
        format_price(totals.discount.to_minor_units(), currency)
    )?;
    writeln!(
        out,
        "Tax ({}%): {}",
        totals.tax_rate,
        format_price(totals.tax.to_minor_units(), currency)
    )?;
    writeln!(
        out,
        "Net Total: {}",
        format_price(totals.net.to_minor_units(), currency)
    )?;

    Ok(())
}

fn adjust<S: KeyValueStore, W: Write>(
    register: &mut Register<S>,
    args: &AdjustArgs,
    out: &mut W,
) -> Result<(), CliError> {
    if let Some(discount) = args.discount.as_deref() {
        register.set_discount(parse_amount(discount)?)?;
    }

    if let Some(tax) = args.tax {
        register.set_tax_rate(tax)?;
    }

    if let Some(threshold) = args.low_stock_threshold {
        register.set_low_stock_threshold(threshold)?;
    }

    let adjustments = register.adjustments();

    writeln!(
        out,
        "Discount: {}",
        format_price(adjustments.discount(), register.currency())
    )?;
    writeln!(out, "Tax: {}%", adjustments.tax_rate())?;
    writeln!(out, "Low-stock threshold: {}", register.low_stock_threshold())?;

    Ok(())
}

fn checkout<S: KeyValueStore, W: Write>(
    register: &mut Register<S>,
    args: &CheckoutArgs,
    config: &Config,
    out: &mut W,
) -> Result<(), CliError> {
    if config.checkout_delay_ms > 0 && !register.cart().is_empty() {
        writeln!(out, "Processing {} payment...", args.mode)?;
        thread::sleep(Duration::from_millis(config.checkout_delay_ms));
    }

    let sale_id = register.checkout(args.mode)?.id.clone();
    let receipt = register.receipt(&sale_id)?;

    writeln!(out, "Payment received via {}", args.mode)?;

    print_receipt(&receipt, args.html.as_deref(), out)
}

fn print_receipt<W: Write>(
    receipt: &Receipt,
    html: Option<&Path>,
    out: &mut W,
) -> Result<(), CliError> {
    match html {
        Some(path) => {
            let renderer = HtmlReceiptRenderer::new(path, receipt);

            renderer.write()?;

            writeln!(
                out,
                "Receipt {} written to {}",
                receipt.sale().id,
                renderer.output_path().display()
            )?;
        }
        None => receipt.write_to(&mut *out)?,
    }

    Ok(())
}

fn receipt<S: KeyValueStore, W: Write>(
    register: &Register<S>,
    args: &ReceiptArgs,
    out: &mut W,
) -> Result<(), CliError> {
    let receipt = match args.sale_id.as_deref() {
        Some(sale_id) => register.receipt(sale_id)?,
        None => register.draft_receipt(args.mode)?,
    };

    print_receipt(&receipt, args.html.as_deref(), out)
}

fn list_sales<S: KeyValueStore, W: Write>(
    register: &Register<S>,
    args: &SalesArgs,
    out: &mut W,
) -> Result<(), CliError> {
    let filter = args.filter.filter(register.today());
    let sales = register.filtered_sales(&filter);
    let page = paginate(&sales, args.page, args.page_size);
    let currency = register.currency();

    if page.total_items == 0 {
        writeln!(out, "No sales match.")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Bill", "Time", "Mode", "Items", "Net"]);

    for sale in page.items {
        builder.push_record([
            sale.id.clone(),
            sale.time
                .to_zoned(register.time_zone().clone())
                .strftime(LOCAL_TIME_FORMAT)
                .to_string(),
            sale.mode.to_string(),
            sale.item_count().to_string(),
            format_price(sale.net, currency),
        ]);
    }

    let mut table = styled(builder);

    table.modify(Columns::new(3..), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(
        out,
        "Page {} of {} ({} sales)",
        page.number, page.total_pages, page.total_items
    )?;

    Ok(())
}

fn export<S: KeyValueStore, W: Write>(
    register: &Register<S>,
    args: &ExportArgs,
    out: &mut W,
) -> Result<(), CliError> {
    let filter = args.filter.filter(register.today());
    let sales = register.filtered_sales(&filter);

    export_to_path(sales.iter().copied(), &args.output)?;

    writeln!(
        out,
        "Exported {} sales to {}",
        sales.len(),
        args.output.display()
    )?;

    Ok(())
}

fn analytics<S: KeyValueStore, W: Write>(
    register: &Register<S>,
    args: &AnalyticsArgs,
    out: &mut W,
) -> Result<(), CliError> {
    let currency = register.currency();
    let report = register.analytics(args.days, args.top);

    let mut daily = Builder::default();

    daily.push_record(["Day", "Net", "3-day avg"]);

    for (day, average) in report.daily.iter().zip(&report.moving_average) {
        let average = average.round().to_i64().unwrap_or_default();

        daily.push_record([
            day.label.clone(),
            format_price(day.net, currency),
            format_price(average, currency),
        ]);
    }

    let mut daily = styled(daily);

    daily.modify(Columns::new(1..), Alignment::right());

    let mut modes = Builder::default();

    modes.push_record(["Mode", "Sales", "Net"]);

    for total in &report.by_mode {
        modes.push_record([
            total.mode.to_string(),
            total.count.to_string(),
            format_price(total.net, currency),
        ]);
    }

    let mut modes = styled(modes);

    modes.modify(Columns::new(1..), Alignment::right());

    writeln!(out, "Sales trend (last {} days)", args.days)?;
    writeln!(out, "{daily}")?;
    writeln!(out, "By payment mode")?;
    writeln!(out, "{modes}")?;

    if report.top_products.is_empty() {
        writeln!(out, "No products sold yet.")?;
    } else {
        let mut top = Builder::default();

        top.push_record(["Product", "Qty"]);

        for product in &report.top_products {
            top.push_record([product.name.clone(), product.quantity.to_string()]);
        }

        let mut top = styled(top);

        top.modify(Columns::new(1..), Alignment::right());

        writeln!(out, "Top products")?;
        writeln!(out, "{top}")?;
    }

    writeln!(
        out,
        "Today: {} sales, {}",
        report.today.count,
        format_price(report.today.net, currency)
    )?;

    Ok(())
}

fn today<S: KeyValueStore, W: Write>(register: &Register<S>, out: &mut W) -> Result<(), CliError> {
    let summary = register.today_summary();

    writeln!(
        out,
        "Today: {} sales, {}",
        summary.count,
        format_price(summary.net, register.currency())
    )?;

    Ok(())
}

fn profile<S: KeyValueStore, W: Write>(
    register: &mut Register<S>,
    command: ProfileSubcommand,
    out: &mut W,
) -> Result<(), CliError> {
    let profile = match command {
        ProfileSubcommand::Show => register.profile(),
        ProfileSubcommand::Set(args) => register.update_profile(args.into())?,
    };

    let mut builder = Builder::default();

    builder.push_record(["Field", "Value"]);

    for (field, value) in [
        ("Shop", &profile.shop_name),
        ("Owner", &profile.owner),
        ("Phone", &profile.phone),
        ("GSTIN", &profile.gstin),
        ("Address", &profile.address),
        ("Hours", &profile.hours),
        ("Avatar", &profile.avatar),
    ] {
        builder.push_record([field, value.as_str()]);
    }

    writeln!(out, "{}", styled(builder))?;

    Ok(())
}

fn product<S: KeyValueStore, W: Write>(
    register: &mut Register<S>,
    command: ProductSubcommand,
    out: &mut W,
) -> Result<(), CliError> {
    let currency = register.currency();

    let product = match command {
        ProductSubcommand::Price { product_id, price } => {
            register.set_price(&product_id, parse_amount(&price)?)?
        }
        ProductSubcommand::Restock {
            product_id,
            quantity,
        } => register.restock(&product_id, quantity)?,
    };

    writeln!(
        out,
        "{} ({}): {}, {} in stock",
        product.name,
        product.id,
        format_price(product.price, currency),
        product.stock
    )?;

    Ok(())
}
