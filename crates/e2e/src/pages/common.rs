//! Navbar, modal and alert locators shared by every screen, plus the
//! helpers that operate on them.

use shopcheck_common::CheckResult;

use crate::fixtures::MenuOption;
use crate::locator::{AriaRole, Locator};
use crate::session::Session;

/// Bootstrap marks the open modal with `.show`
const OPEN_MODAL: &str = ".modal.show";

#[derive(Debug, Clone, Copy, Default)]
pub struct CommonPage;

impl CommonPage {
    pub fn navbar_title(&self) -> Locator {
        Locator::by_role(AriaRole::Link, "PRODUCT STORE")
    }

    pub fn menu_link(&self, option: MenuOption) -> Locator {
        Locator::by_role_exact(AriaRole::Link, option.label())
    }

    pub fn modal_title(&self) -> Locator {
        Locator::css(&format!("{} .modal-title", OPEN_MODAL))
    }

    pub fn modal_body(&self) -> Locator {
        Locator::css(&format!("{} .modal-body", OPEN_MODAL))
    }

    pub fn close_modal_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Button, "Close").within(Locator::css(OPEN_MODAL))
    }

    pub fn ok_button(&self) -> Locator {
        Locator::by_role_exact(AriaRole::Button, "OK")
    }

    pub fn alert_message(&self) -> Locator {
        Locator::css(".alert")
    }
}

pub async fn click_menu_option(session: &Session, option: MenuOption) -> CheckResult<()> {
    session.click(&CommonPage.menu_link(option)).await
}

/// Wait until a modal titled `title` is open
pub async fn wait_for_modal(session: &Session, title: &str) -> CheckResult<()> {
    let locator = CommonPage.modal_title();
    session.expect_visible(&locator).await?;
    session.expect_contains_text(&locator, title).await
}

pub async fn close_modal(session: &Session) -> CheckResult<()> {
    session.click(&CommonPage.close_modal_button()).await
}

pub async fn accept_alert(session: &Session) -> CheckResult<()> {
    session.click(&CommonPage.ok_button()).await
}

/// Text of the in-page alert, empty when there is none
pub async fn alert_text(session: &Session) -> CheckResult<String> {
    Ok(session
        .text_content(&CommonPage.alert_message())
        .await?
        .unwrap_or_default())
}

pub async fn navigate_to(session: &Session, path: &str) -> CheckResult<()> {
    session.goto(path).await
}
