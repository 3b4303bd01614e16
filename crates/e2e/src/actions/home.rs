use shopcheck_common::CheckResult;

use crate::fixtures::{Category, MenuOption};
use crate::pages::HomePage;
use crate::session::{pattern, Session};

pub struct HomeActions<'s> {
    session: &'s Session,
    page: HomePage,
}

impl<'s> HomeActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            page: HomePage,
        }
    }

    pub async fn check_home_page_title(&self) -> CheckResult<()> {
        self.session.expect_title(&pattern("STORE")?).await
    }

    pub async fn verify_navbar_title(&self) -> CheckResult<()> {
        self.session
            .expect_text(&self.page.navbar_title(), "PRODUCT STORE")
            .await
    }

    pub async fn select_category(&self, category: Category) -> CheckResult<()> {
        self.session.click(&self.page.category(category)).await
    }

    pub async fn select_product(&self, name: &str) -> CheckResult<()> {
        self.session.click(&self.page.product(name)).await
    }

    pub async fn select_menu_option(&self, option: MenuOption) -> CheckResult<()> {
        self.session.click(&self.page.menu_option(option)).await
    }

    /// A product card on the listing shows `$<price>`
    pub async fn check_product_price(&self, price: u32) -> CheckResult<()> {
        self.session
            .expect_visible(&self.page.product_price(&format!("${}", price)))
            .await
    }
}
