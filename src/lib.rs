//! Till
//!
//! Till is a point-of-sale engine for a small retail shop: product catalog,
//! stock-aware cart, checkout with discount and tax, receipts, sales history,
//! CSV export and sales analytics, persisted to a local key/value store.

pub mod analytics;
pub mod cart;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod export;
pub mod fixtures;
pub mod history;
pub mod logging;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod profile;
pub mod receipt;
pub mod register;
pub mod sales;
pub mod storage;
