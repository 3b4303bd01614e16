use shopcheck_common::CheckResult;

use crate::pages::SignUpPage;
use crate::session::Session;

pub struct SignUpActions<'s> {
    session: &'s Session,
    page: SignUpPage,
}

impl<'s> SignUpActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            page: SignUpPage,
        }
    }

    pub async fn fill_username(&self, username: &str) -> CheckResult<()> {
        self.session.fill(&self.page.username_input(), username).await
    }

    pub async fn fill_user_password(&self, password: &str) -> CheckResult<()> {
        self.session.fill(&self.page.password_input(), password).await
    }

    pub async fn select_signup(&self) -> CheckResult<()> {
        self.session.arm_dialog().await?;
        self.session.click(&self.page.signup_button()).await
    }

    pub async fn check_dialog_message(&self, message: &str) -> CheckResult<()> {
        self.session.expect_dialog(message).await
    }
}
