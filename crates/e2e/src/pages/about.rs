use crate::locator::{AriaRole, Locator};

#[derive(Debug, Clone, Copy, Default)]
pub struct AboutUsPage;

impl AboutUsPage {
    pub fn title(&self) -> Locator {
        Locator::by_role(AriaRole::Heading, "About us")
    }

    pub fn close_button(&self) -> Locator {
        Locator::text_exact("Close").within(Locator::css("#videoModal"))
    }
}
