use crate::locator::{AriaRole, Locator};

#[derive(Debug, Clone, Copy, Default)]
pub struct ContactPage;

impl ContactPage {
    pub fn modal_title(&self) -> Locator {
        Locator::css("#exampleModal .modal-title")
    }

    pub fn email_input(&self) -> Locator {
        Locator::css("#recipient-email")
    }

    pub fn name_input(&self) -> Locator {
        Locator::css("#recipient-name")
    }

    pub fn message_input(&self) -> Locator {
        Locator::css("#message-text")
    }

    pub fn send_message_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Button, "Send message")
    }
}
