use crate::locator::{AriaRole, Locator};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoginPage;

impl LoginPage {
    pub fn modal_title(&self) -> Locator {
        Locator::css("#logInModal .modal-title")
    }

    pub fn username_input(&self) -> Locator {
        Locator::css("#loginusername")
    }

    pub fn password_input(&self) -> Locator {
        Locator::css("#loginpassword")
    }

    pub fn login_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Button, "Log in")
    }
}
