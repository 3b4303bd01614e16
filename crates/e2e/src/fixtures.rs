//! Static storefront test data
//!
//! The product catalog is embedded from `fixtures/products.json`, parsed on
//! first use and cached for the rest of the process.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;

use shopcheck_common::{CheckError, CheckResult};

const PRODUCTS_JSON: &str = include_str!("../fixtures/products.json");

static CATALOG: OnceCell<ProductCatalog> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Phones,
    Laptops,
    Monitors,
}

impl Category {
    /// Label of the category link on the home page
    pub fn label(&self) -> &'static str {
        match self {
            Category::Phones => "Phones",
            Category::Laptops => "Laptops",
            Category::Monitors => "Monitors",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Navbar entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Home,
    Contact,
    AboutUs,
    Cart,
    LogIn,
    LogOut,
    SignUp,
}

impl MenuOption {
    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::Home => "Home",
            MenuOption::Contact => "Contact",
            MenuOption::AboutUs => "About us",
            MenuOption::Cart => "Cart",
            MenuOption::LogIn => "Log in",
            MenuOption::LogOut => "Log out",
            MenuOption::SignUp => "Sign up",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: u32,
    pub category: Category,
    pub description: String,
}

impl Product {
    /// Price as shown on the product page, e.g. `$360 *includes tax`
    pub fn price_label(&self) -> String {
        format!("${} *includes tax", self.price)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCatalog {
    pub phones: Vec<Product>,
    pub laptops: Vec<Product>,
    pub monitors: Vec<Product>,
}

impl ProductCatalog {
    /// The process-wide catalog
    pub fn get() -> CheckResult<&'static ProductCatalog> {
        CATALOG.get_or_try_init(|| Self::from_json(PRODUCTS_JSON))
    }

    pub fn from_json(json: &str) -> CheckResult<Self> {
        let catalog: ProductCatalog = serde_json::from_str(json)
            .map_err(|e| CheckError::Fixture(format!("products.json: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> CheckResult<()> {
        for category in [Category::Phones, Category::Laptops, Category::Monitors] {
            let misplaced = self.by_category(category).iter().find(|p| p.category != category);
            if let Some(product) = misplaced {
                return Err(CheckError::Fixture(format!(
                    "{} is listed under {} but has category {}",
                    product.name, category, product.category
                )));
            }
        }
        Ok(())
    }

    pub fn by_category(&self, category: Category) -> &[Product] {
        match category {
            Category::Phones => &self.phones,
            Category::Laptops => &self.laptops,
            Category::Monitors => &self.monitors,
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &Product> {
        self.phones.iter().chain(&self.laptops).chain(&self.monitors)
    }

    /// Case-insensitive lookup by product name
    pub fn find(&self, name: &str) -> Option<&Product> {
        let name = name.trim();
        self.all().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn product(&self, name: &str) -> CheckResult<&Product> {
        self.find(name)
            .ok_or_else(|| CheckError::Fixture(format!("no product named '{}'", name)))
    }
}

/// Look up a product in the process-wide catalog
pub fn product(name: &str) -> CheckResult<Product> {
    ProductCatalog::get()?.product(name).cloned()
}

/// Checkout form data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    pub name: String,
    pub country: String,
    pub city: String,
    pub card: String,
    pub month: String,
    pub year: String,
}

impl CustomerData {
    pub fn john() -> Self {
        Self {
            name: "John Doe".to_string(),
            country: "USA".to_string(),
            city: "New York".to_string(),
            card: "1234567890123456".to_string(),
            month: "12".to_string(),
            year: "2025".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

impl UserCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Credentials the storefront rejects
    pub fn invalid() -> Self {
        Self::new("invaliduser", "wrongpassword")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads_and_is_cached() {
        let first = ProductCatalog::get().unwrap();
        let second = ProductCatalog::get().unwrap();
        assert!(std::ptr::eq(first, second));

        assert_eq!(first.phones.len(), 7);
        assert_eq!(first.laptops.len(), 6);
        assert_eq!(first.monitors.len(), 2);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let catalog = ProductCatalog::get().unwrap();
        let s6 = catalog.find("Samsung Galaxy S6").unwrap();
        assert_eq!(s6.price, 360);
        assert_eq!(s6.category, Category::Phones);
        assert_eq!(s6.price_label(), "$360 *includes tax");

        assert_eq!(catalog.product("asus full hd").unwrap().price, 230);
        assert!(catalog.product("Commodore 64").is_err());
    }

    #[test]
    fn test_category_mismatch_rejected() {
        let json = r#"{
            "phones": [
                {"id": "1", "name": "x", "price": 1, "category": "Monitors", "description": ""}
            ],
            "laptops": [],
            "monitors": []
        }"#;
        let err = ProductCatalog::from_json(json).unwrap_err();
        assert!(matches!(err, CheckError::Fixture(_)));
    }

    #[test]
    fn test_customer_fixture() {
        let john = CustomerData::john();
        assert_eq!(john.card.len(), 16);
        assert_eq!(MenuOption::AboutUs.label(), "About us");
    }
}
