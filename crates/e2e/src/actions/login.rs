use shopcheck_common::CheckResult;

use crate::fixtures::UserCredentials;
use crate::pages::LoginPage;
use crate::session::Session;

pub struct LoginActions<'s> {
    session: &'s Session,
    page: LoginPage,
}

impl<'s> LoginActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            page: LoginPage,
        }
    }

    pub async fn fill_username(&self, username: &str) -> CheckResult<()> {
        self.session.fill(&self.page.username_input(), username).await
    }

    pub async fn fill_password(&self, password: &str) -> CheckResult<()> {
        self.session.fill(&self.page.password_input(), password).await
    }

    pub async fn click_login(&self) -> CheckResult<()> {
        self.session.arm_dialog().await?;
        self.session.click(&self.page.login_button()).await
    }

    pub async fn login(&self, credentials: &UserCredentials) -> CheckResult<()> {
        self.fill_username(&credentials.username).await?;
        self.fill_password(&credentials.password).await?;
        self.click_login().await
    }

    pub async fn verify_login_modal_visible(&self) -> CheckResult<()> {
        self.session.expect_visible(&self.page.modal_title()).await
    }

    /// The storefront answers a failed login with an alert dialog
    pub async fn check_login_alert(&self, message: &str) -> CheckResult<()> {
        self.session.expect_dialog(message).await
    }
}
