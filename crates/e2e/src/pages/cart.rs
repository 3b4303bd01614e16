use crate::locator::{AriaRole, Locator};

#[derive(Debug, Clone, Copy, Default)]
pub struct CartPage;

impl CartPage {
    pub fn product_cell(&self, name: &str) -> Locator {
        Locator::by_role_ignore_case(AriaRole::Cell, name)
    }

    /// The cart table row holding `name`
    pub fn product_row(&self, name: &str) -> Locator {
        Locator::css("#tbodyid tr").has_text(name)
    }

    /// Delete link on the row holding `name`
    pub fn delete_button(&self, name: &str) -> Locator {
        Locator::by_role_exact(AriaRole::Link, "Delete").within(self.product_row(name))
    }

    pub fn place_order_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Button, "Place Order")
    }

    pub fn total(&self) -> Locator {
        Locator::css("#totalp")
    }
}
