use shopcheck_common::CheckResult;

use crate::pages::AboutUsPage;
use crate::session::Session;

pub struct AboutUsActions<'s> {
    session: &'s Session,
    page: AboutUsPage,
}

impl<'s> AboutUsActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            page: AboutUsPage,
        }
    }

    pub async fn is_about_us_title_displayed(&self) -> CheckResult<()> {
        self.session.expect_visible(&self.page.title()).await
    }

    pub async fn close_modal(&self) -> CheckResult<()> {
        self.session.click(&self.page.close_button()).await
    }
}
