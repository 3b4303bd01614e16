use crate::locator::{AriaRole, Locator};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceOrderPage;

impl PlaceOrderPage {
    pub fn modal_title(&self) -> Locator {
        Locator::css("#orderModal .modal-title")
    }

    pub fn name_input(&self) -> Locator {
        Locator::css("#name")
    }

    pub fn country_input(&self) -> Locator {
        Locator::css("#country")
    }

    pub fn city_input(&self) -> Locator {
        Locator::css("#city")
    }

    pub fn card_input(&self) -> Locator {
        Locator::css("#card")
    }

    pub fn month_input(&self) -> Locator {
        Locator::css("#month")
    }

    pub fn year_input(&self) -> Locator {
        Locator::css("#year")
    }

    pub fn purchase_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Button, "Purchase")
    }

    pub fn thank_you_message(&self) -> Locator {
        Locator::by_role(AriaRole::Heading, "Thank you for your purchase!")
    }

    /// Confirmation details (order id, amount, card)
    pub fn confirmation_details(&self) -> Locator {
        Locator::css(".sweet-alert .lead")
    }

    pub fn confirm_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Button, "OK")
    }
}
