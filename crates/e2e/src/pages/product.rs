use crate::locator::{AriaRole, Locator};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductPage;

impl ProductPage {
    pub fn product_label(&self, name: &str) -> Locator {
        Locator::by_role_ignore_case(AriaRole::Heading, name)
    }

    pub fn price_label(&self, price: &str) -> Locator {
        Locator::css(".price-container").has_text(price)
    }

    pub fn add_to_cart_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Link, "Add to cart")
    }

    pub fn description(&self) -> Locator {
        Locator::css("#more-information p")
    }
}
