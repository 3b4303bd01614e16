use shopcheck_common::CheckResult;

use crate::pages::ProductPage;
use crate::session::Session;

/// Alert shown after adding to the cart
pub const PRODUCT_ADDED: &str = "Product added";

pub struct ProductActions<'s> {
    session: &'s Session,
    page: ProductPage,
}

impl<'s> ProductActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            page: ProductPage,
        }
    }

    /// The product page heading shows `name`
    pub async fn check_added_product(&self, name: &str) -> CheckResult<()> {
        self.session
            .expect_text(&self.page.product_label(name), name)
            .await
    }

    pub async fn check_product_price(&self, price: u32) -> CheckResult<()> {
        let amount = format!("${}", price);
        self.session
            .expect_text(
                &self.page.price_label(&amount),
                &format!("{} *includes tax", amount),
            )
            .await
    }

    /// Click "Add to cart"; the confirmation dialog is accepted by the driver
    pub async fn add_to_cart(&self) -> CheckResult<()> {
        self.session.arm_dialog().await?;
        self.session.click(&self.page.add_to_cart_button()).await
    }

    pub async fn check_product_added_alert(&self) -> CheckResult<()> {
        self.session.expect_dialog(PRODUCT_ADDED).await
    }

    pub async fn check_product_description(&self, description: &str) -> CheckResult<()> {
        self.session
            .expect_contains_text(&self.page.description(), description)
            .await
    }
}
