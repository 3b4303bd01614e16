//! Locator layer
//!
//! One zero-sized struct per storefront screen. Methods only build
//! [`Locator`](crate::locator::Locator)s; behaviour lives in the actions.

pub mod about;
pub mod cart;
pub mod common;
pub mod contact;
pub mod home;
pub mod login;
pub mod place_order;
pub mod product;
pub mod signup;

pub use about::AboutUsPage;
pub use cart::CartPage;
pub use common::CommonPage;
pub use contact::ContactPage;
pub use home::HomePage;
pub use login::LoginPage;
pub use place_order::PlaceOrderPage;
pub use product::ProductPage;
pub use signup::SignUpPage;
