use shopcheck_common::CheckResult;

use crate::pages::ContactPage;
use crate::session::Session;

pub const MESSAGE_SENT: &str = "Thanks for the message!!";

pub struct ContactActions<'s> {
    session: &'s Session,
    page: ContactPage,
}

impl<'s> ContactActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            page: ContactPage,
        }
    }

    pub async fn fill_contact_form(
        &self,
        email: &str,
        name: &str,
        message: &str,
    ) -> CheckResult<()> {
        self.session.fill(&self.page.email_input(), email).await?;
        self.session.fill(&self.page.name_input(), name).await?;
        self.session.fill(&self.page.message_input(), message).await
    }

    pub async fn send_message(&self) -> CheckResult<()> {
        self.session.arm_dialog().await?;
        self.session.click(&self.page.send_message_button()).await
    }

    pub async fn verify_contact_modal_visible(&self) -> CheckResult<()> {
        self.session.expect_visible(&self.page.modal_title()).await
    }

    pub async fn check_message_sent_alert(&self) -> CheckResult<()> {
        self.session.expect_dialog(MESSAGE_SENT).await
    }
}
