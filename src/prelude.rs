//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    analytics::{AnalyticsReport, SalesSummary},
    cart::{Cart, CartError, CartLine},
    checkout::{CheckoutError, CheckoutOutcome, CheckoutRequest, checkout},
    export::{ExportError, SaleCsvRow, export_to_path, sales_to_csv},
    history::{DateRange, ModeFilter, Page, QuickRange, SalesFilter, paginate},
    money::{AmountError, format_price},
    pricing::{Adjustments, TaxRate, Totals},
    products::{Catalog, Product, ProductQuery, StockAlerts},
    profile::{Profile, ProfileUpdate},
    receipt::{HtmlReceiptRenderer, Receipt, ReceiptError},
    register::{Register, RegisterError},
    sales::{PaymentMode, Sale, SaleLine, SalesLedger},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
};
