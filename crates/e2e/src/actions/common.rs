use shopcheck_common::CheckResult;

use crate::fixtures::MenuOption;
use crate::pages::common;
use crate::session::Session;

/// Helpers valid on any screen
pub struct CommonActions<'s> {
    session: &'s Session,
}

impl<'s> CommonActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    pub async fn open_home(&self) -> CheckResult<()> {
        common::navigate_to(self.session, "").await
    }

    pub async fn navigate_to(&self, path: &str) -> CheckResult<()> {
        common::navigate_to(self.session, path).await
    }

    pub async fn click_menu_option(&self, option: MenuOption) -> CheckResult<()> {
        common::click_menu_option(self.session, option).await
    }

    pub async fn wait_for_modal(&self, title: &str) -> CheckResult<()> {
        common::wait_for_modal(self.session, title).await
    }

    pub async fn close_modal(&self) -> CheckResult<()> {
        common::close_modal(self.session).await
    }

    pub async fn accept_alert(&self) -> CheckResult<()> {
        common::accept_alert(self.session).await
    }

    pub async fn alert_text(&self) -> CheckResult<String> {
        common::alert_text(self.session).await
    }

    pub async fn expect_url(&self, url_pattern: &str) -> CheckResult<()> {
        self.session
            .expect_url(&crate::session::pattern(url_pattern)?)
            .await
    }
}
