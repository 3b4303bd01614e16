//! Action layer
//!
//! One wrapper per screen, each borrowing the shared [`Session`]. A method
//! performs a single user interaction or a single expectation.
//!
//! [`Session`]: crate::session::Session

pub mod about;
pub mod cart;
pub mod common;
pub mod contact;
pub mod factory;
pub mod home;
pub mod login;
pub mod place_order;
pub mod product;
pub mod signup;

pub use about::AboutUsActions;
pub use cart::CartActions;
pub use common::CommonActions;
pub use contact::ContactActions;
pub use factory::ActionFactory;
pub use home::HomeActions;
pub use login::LoginActions;
pub use place_order::PlaceOrderActions;
pub use product::ProductActions;
pub use signup::SignUpActions;
