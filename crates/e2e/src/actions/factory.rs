use crate::actions::{
    AboutUsActions, CartActions, CommonActions, ContactActions, HomeActions, LoginActions,
    PlaceOrderActions, ProductActions, SignUpActions,
};
use crate::session::Session;

/// Hands out action wrappers bound to one session.
///
/// Every call returns a fresh wrapper; all of them share the session and
/// none of them closes it.
#[derive(Clone, Copy)]
pub struct ActionFactory<'s> {
    session: &'s Session,
}

impl<'s> ActionFactory<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    pub fn create_home_actions(&self) -> HomeActions<'s> {
        HomeActions::new(self.session)
    }

    pub fn create_product_actions(&self) -> ProductActions<'s> {
        ProductActions::new(self.session)
    }

    pub fn create_cart_actions(&self) -> CartActions<'s> {
        CartActions::new(self.session)
    }

    pub fn create_login_actions(&self) -> LoginActions<'s> {
        LoginActions::new(self.session)
    }

    pub fn create_signup_actions(&self) -> SignUpActions<'s> {
        SignUpActions::new(self.session)
    }

    pub fn create_contact_actions(&self) -> ContactActions<'s> {
        ContactActions::new(self.session)
    }

    pub fn create_about_us_actions(&self) -> AboutUsActions<'s> {
        AboutUsActions::new(self.session)
    }

    pub fn create_place_order_actions(&self) -> PlaceOrderActions<'s> {
        PlaceOrderActions::new(self.session)
    }

    pub fn create_common_actions(&self) -> CommonActions<'s> {
        CommonActions::new(self.session)
    }
}
