//! Products

use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// Label of the pseudo-category that matches every product.
pub const ALL_CATEGORIES: &str = "All";

/// Product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Stock keeping unit, also accepted by quick add
    pub sku: String,

    /// Product category
    pub category: String,

    /// Unit price in minor units
    pub price: i64,

    /// Units on the shelf
    pub stock: u32,
}

/// A category with the number of products in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    /// Category name, or [`ALL_CATEGORIES`].
    pub name: String,

    /// Number of products in the category.
    pub count: usize,
}

/// Product listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive text matched against name, SKU and category.
    pub search: String,

    /// Category to restrict to; `None` matches every category.
    pub category: Option<String>,

    /// Only keep products whose remaining stock is at or below the low-stock threshold.
    pub low_stock_only: bool,
}

impl ProductQuery {
    /// Restrict the query to a category. [`ALL_CATEGORIES`] clears the restriction.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();

        self.category = (category != ALL_CATEGORIES).then_some(category);
        self
    }

    fn matches(&self, product: &Product) -> bool {
        let needle = self.search.trim().to_lowercase();

        let matches_search = needle.is_empty()
            || [&product.name, &product.sku, &product.category]
                .iter()
                .any(|value| value.to_lowercase().contains(&needle));

        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|category| product.category == category);

        matches_search && matches_category
    }
}

/// Products that need restocking once cart reservations are accounted for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockAlerts<'a> {
    /// Products with some stock left, but no more than the threshold.
    pub low: Vec<&'a Product>,

    /// Products with nothing left to sell.
    pub out: Vec<&'a Product>,
}

/// Product catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create a catalog from a list of products.
    #[must_use]
    pub fn new(products: impl Into<Vec<Product>>) -> Self {
        Self {
            products: products.into(),
        }
    }

    /// Look up a product by identifier.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Look up a product by SKU or identifier, as typed into the quick-add box.
    ///
    /// The code is trimmed; an empty code matches nothing.
    pub fn find_by_code(&self, code: &str) -> Option<&Product> {
        let code = code.trim();

        if code.is_empty() {
            return None;
        }

        self.products
            .iter()
            .find(|product| product.sku == code || product.id == code)
    }

    /// Iterate over the products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Get the number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// `All` followed by each distinct category in first-seen order, with product counts.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut categories = vec![CategoryCount {
            name: ALL_CATEGORIES.to_string(),
            count: self.products.len(),
        }];

        for product in &self.products {
            match categories
                .iter_mut()
                .skip(1)
                .find(|category| category.name == product.category)
            {
                Some(category) => category.count += 1,
                None => categories.push(CategoryCount {
                    name: product.category.clone(),
                    count: 1,
                }),
            }
        }

        categories
    }

    /// Products matching the query, in catalog order.
    pub fn filter<'a>(
        &'a self,
        query: &ProductQuery,
        cart: &Cart,
        low_stock_threshold: u32,
    ) -> Vec<&'a Product> {
        self.products
            .iter()
            .filter(|product| query.matches(product))
            .filter(|product| {
                !query.low_stock_only || cart.remaining_stock(product) <= low_stock_threshold
            })
            .collect()
    }

    /// Low-stock and out-of-stock products given what is already in the cart.
    pub fn stock_alerts<'a>(&'a self, cart: &Cart, low_stock_threshold: u32) -> StockAlerts<'a> {
        let mut alerts = StockAlerts::default();

        for product in &self.products {
            match cart.remaining_stock(product) {
                0 => alerts.out.push(product),
                remaining if remaining <= low_stock_threshold => alerts.low.push(product),
                _ => {}
            }
        }

        alerts
    }

    /// Change a product's shelf price. Existing cart lines keep their snapshot.
    ///
    /// Returns the updated product, or `None` if no product has that identifier.
    pub fn set_price(&mut self, id: &str, price: i64) -> Option<&Product> {
        let product = self.products.iter_mut().find(|product| product.id == id)?;

        product.price = price;

        Some(product)
    }

    /// Add units to a product's stock, saturating at `u32::MAX`.
    ///
    /// Returns the updated product, or `None` if no product has that identifier.
    pub fn restock(&mut self, id: &str, quantity: u32) -> Option<&Product> {
        let product = self.products.iter_mut().find(|product| product.id == id)?;

        product.stock = product.stock.saturating_add(quantity);

        Some(product)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use testresult::TestResult;

    use super::*;

    pub(crate) fn product(id: &str, category: &str, price: i64, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            sku: format!("SKU-{id}"),
            category: category.to_string(),
            price,
            stock,
        }
    }

    pub(crate) fn test_catalog() -> Catalog {
        Catalog::new(vec![
            Product {
                id: "p1".to_string(),
                name: "Basmati Rice 1kg".to_string(),
                sku: "RICE1".to_string(),
                category: "Grocery".to_string(),
                price: 9500,
                stock: 10,
            },
            Product {
                id: "p2".to_string(),
                name: "Toor Dal 1kg".to_string(),
                sku: "DAL1".to_string(),
                category: "Grocery".to_string(),
                price: 14000,
                stock: 2,
            },
            Product {
                id: "p3".to_string(),
                name: "Bath Soap".to_string(),
                sku: "SOAP".to_string(),
                category: "Personal Care".to_string(),
                price: 3500,
                stock: 0,
            },
            Product {
                id: "p4".to_string(),
                name: "Green Tea".to_string(),
                sku: "TEA".to_string(),
                category: "Beverages".to_string(),
                price: 22000,
                stock: 5,
            },
        ])
    }

    #[test]
    fn categories_start_with_all_and_keep_first_seen_order() {
        let categories = test_catalog().categories();

        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        let counts: Vec<usize> = categories.iter().map(|c| c.count).collect();

        assert_eq!(names, ["All", "Grocery", "Personal Care", "Beverages"]);
        assert_eq!(counts, [4, 2, 1, 1]);
    }

    #[test]
    fn find_by_code_matches_sku_or_id() {
        let catalog = test_catalog();

        assert_eq!(catalog.find_by_code("DAL1").map(|p| p.id.as_str()), Some("p2"));
        assert_eq!(catalog.find_by_code(" p4 ").map(|p| p.id.as_str()), Some("p4"));
        assert!(catalog.find_by_code("nope").is_none());
        assert!(catalog.find_by_code("   ").is_none());
    }

    #[test]
    fn filter_searches_name_sku_and_category_case_insensitively() {
        let catalog = test_catalog();
        let cart = Cart::default();

        let by_name = ProductQuery {
            search: "  rice ".to_string(),
            ..ProductQuery::default()
        };

        let by_sku = ProductQuery {
            search: "soap".to_string(),
            ..ProductQuery::default()
        };

        let by_category = ProductQuery {
            search: "BEVERAGE".to_string(),
            ..ProductQuery::default()
        };

        let ids = |query: &ProductQuery| -> Vec<String> {
            catalog
                .filter(query, &cart, 3)
                .into_iter()
                .map(|p| p.id.clone())
                .collect()
        };

        assert_eq!(ids(&by_name), ["p1"]);
        assert_eq!(ids(&by_sku), ["p3"]);
        assert_eq!(ids(&by_category), ["p4"]);
        assert_eq!(ids(&ProductQuery::default()).len(), 4);
    }

    #[test]
    fn filter_by_category_and_all() {
        let catalog = test_catalog();
        let cart = Cart::default();

        let grocery = ProductQuery::default().in_category("Grocery");
        let all = ProductQuery::default().in_category(ALL_CATEGORIES);

        assert_eq!(catalog.filter(&grocery, &cart, 3).len(), 2);
        assert_eq!(all.category, None);
        assert_eq!(catalog.filter(&all, &cart, 3).len(), 4);
    }

    #[test]
    fn low_stock_filter_accounts_for_cart() -> TestResult {
        let catalog = test_catalog();
        let mut cart = Cart::default();

        let query = ProductQuery {
            low_stock_only: true,
            ..ProductQuery::default()
        };

        let before: Vec<&str> = catalog
            .filter(&query, &cart, 3)
            .iter()
            .map(|p| p.id.as_str())
            .collect();

        assert_eq!(before, ["p2", "p3"]);

        cart.add(catalog.get("p4").ok_or("missing p4")?)?;
        cart.add(catalog.get("p4").ok_or("missing p4")?)?;

        let after: Vec<&str> = catalog
            .filter(&query, &cart, 3)
            .iter()
            .map(|p| p.id.as_str())
            .collect();

        assert_eq!(after, ["p2", "p3", "p4"]);

        Ok(())
    }

    #[test]
    fn stock_alerts_split_low_and_out() -> TestResult {
        let catalog = test_catalog();
        let mut cart = Cart::default();

        cart.add(catalog.get("p2").ok_or("missing p2")?)?;
        cart.add(catalog.get("p2").ok_or("missing p2")?)?;

        let alerts = catalog.stock_alerts(&cart, 3);

        let low: Vec<&str> = alerts.low.iter().map(|p| p.id.as_str()).collect();
        let out: Vec<&str> = alerts.out.iter().map(|p| p.id.as_str()).collect();

        assert!(low.is_empty(), "no product has 1..=3 remaining, got {low:?}");
        assert_eq!(out, ["p2", "p3"]);

        Ok(())
    }

    #[test]
    fn set_price_and_restock_update_the_product() {
        let mut catalog = test_catalog();

        assert_eq!(catalog.set_price("p1", 9900).map(|p| p.price), Some(9900));
        assert_eq!(catalog.restock("p3", 12).map(|p| p.stock), Some(12));
        assert!(catalog.set_price("missing", 1).is_none());
        assert!(catalog.restock("missing", 1).is_none());
    }

    #[test]
    fn helper_product_has_predictable_fields() {
        let p = product("x", "Misc", 100, 1);

        assert_eq!(p.sku, "SKU-x");
        assert_eq!(p.name, "Product x");
    }
}
