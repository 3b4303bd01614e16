use crate::fixtures::{Category, MenuOption};
use crate::locator::{AriaRole, Locator};

#[derive(Debug, Clone, Copy, Default)]
pub struct HomePage;

impl HomePage {
    pub fn navbar_title(&self) -> Locator {
        Locator::by_role(AriaRole::Link, "PRODUCT STORE")
    }

    pub fn category(&self, category: Category) -> Locator {
        Locator::by_role(AriaRole::Link, category.label())
    }

    /// Product card link, matched on the whole name ignoring case
    pub fn product(&self, name: &str) -> Locator {
        Locator::by_role_ignore_case(AriaRole::Link, name)
    }

    pub fn product_price(&self, price: &str) -> Locator {
        Locator::css(".card-block h5").has_text(price)
    }

    pub fn menu_option(&self, option: MenuOption) -> Locator {
        Locator::by_role_exact(AriaRole::Link, option.label())
    }
}
