use shopcheck_common::CheckResult;

use crate::pages::CartPage;
use crate::session::Session;

pub struct CartActions<'s> {
    session: &'s Session,
    page: CartPage,
}

impl<'s> CartActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            page: CartPage,
        }
    }

    pub async fn check_product_is_displayed(&self, name: &str) -> CheckResult<()> {
        self.session
            .expect_text(&self.page.product_cell(name), name)
            .await
    }

    /// Delete the row holding `name` and wait until it is gone
    pub async fn delete_product_from_cart(&self, name: &str) -> CheckResult<()> {
        self.session.click(&self.page.delete_button(name)).await?;
        self.session.expect_hidden(&self.page.product_cell(name)).await
    }

    pub async fn select_place_order(&self) -> CheckResult<()> {
        self.session.click(&self.page.place_order_button()).await
    }
}
