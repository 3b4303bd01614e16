use crate::locator::{AriaRole, Locator};

#[derive(Debug, Clone, Copy, Default)]
pub struct SignUpPage;

impl SignUpPage {
    pub fn modal_title(&self) -> Locator {
        Locator::css("#signInModal .modal-title")
    }

    pub fn username_input(&self) -> Locator {
        Locator::css("#sign-username")
    }

    pub fn password_input(&self) -> Locator {
        Locator::css("#sign-password")
    }

    pub fn signup_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Button, "Sign up")
    }
}
