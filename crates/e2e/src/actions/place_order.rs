use shopcheck_common::CheckResult;

use crate::fixtures::CustomerData;
use crate::pages::PlaceOrderPage;
use crate::session::Session;

pub struct PlaceOrderActions<'s> {
    session: &'s Session,
    page: PlaceOrderPage,
}

impl<'s> PlaceOrderActions<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            session,
            page: PlaceOrderPage,
        }
    }

    pub async fn fill_name(&self, name: &str) -> CheckResult<()> {
        self.session.fill(&self.page.name_input(), name).await
    }

    pub async fn fill_country(&self, country: &str) -> CheckResult<()> {
        self.session.fill(&self.page.country_input(), country).await
    }

    pub async fn fill_city(&self, city: &str) -> CheckResult<()> {
        self.session.fill(&self.page.city_input(), city).await
    }

    pub async fn fill_card(&self, card: &str) -> CheckResult<()> {
        self.session.fill(&self.page.card_input(), card).await
    }

    pub async fn fill_month(&self, month: &str) -> CheckResult<()> {
        self.session.fill(&self.page.month_input(), month).await
    }

    pub async fn fill_year(&self, year: &str) -> CheckResult<()> {
        self.session.fill(&self.page.year_input(), year).await
    }

    pub async fn fill_order_form(&self, customer: &CustomerData) -> CheckResult<()> {
        self.fill_name(&customer.name).await?;
        self.fill_country(&customer.country).await?;
        self.fill_city(&customer.city).await?;
        self.fill_card(&customer.card).await?;
        self.fill_month(&customer.month).await?;
        self.fill_year(&customer.year).await
    }

    pub async fn select_purchase(&self) -> CheckResult<()> {
        self.session.click(&self.page.purchase_button()).await
    }

    pub async fn is_thank_you_message_displayed(&self) -> CheckResult<()> {
        self.session
            .expect_visible(&self.page.thank_you_message())
            .await
    }

    /// Dismiss the confirmation
    pub async fn confirm(&self) -> CheckResult<()> {
        self.session.click(&self.page.confirm_button()).await
    }
}
