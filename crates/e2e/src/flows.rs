//! Multi-step storefront flows
//!
//! Each flow runs its actions strictly in order and stops at the first
//! failure. Retrying is left to the suite runner.

use shopcheck_common::CheckResult;
use tracing::debug;

use crate::actions::ActionFactory;
use crate::fixtures::{CustomerData, MenuOption, Product};

/// Open the product from its category and add it to the cart
pub async fn add_product_to_cart(
    actions: &ActionFactory<'_>,
    product: &Product,
) -> CheckResult<()> {
    debug!("flow: add {} to cart", product.name);

    let home = actions.create_home_actions();
    home.select_category(product.category).await?;
    home.select_product(&product.name).await?;

    let product_actions = actions.create_product_actions();
    product_actions.check_added_product(&product.name).await?;
    product_actions.check_product_price(product.price).await?;
    product_actions.add_to_cart().await?;
    product_actions.check_product_added_alert().await
}

/// Add the product, find it in the cart, delete it and see it gone
pub async fn add_and_remove_from_cart(
    actions: &ActionFactory<'_>,
    product: &Product,
) -> CheckResult<()> {
    add_product_to_cart(actions, product).await?;

    actions
        .create_home_actions()
        .select_menu_option(MenuOption::Cart)
        .await?;

    let cart = actions.create_cart_actions();
    cart.check_product_is_displayed(&product.name).await?;
    cart.delete_product_from_cart(&product.name).await
}

/// Full checkout: add, verify and delete in the cart, then place the order
/// and wait for the confirmation.
pub async fn purchase_product(
    actions: &ActionFactory<'_>,
    product: &Product,
    customer: &CustomerData,
) -> CheckResult<()> {
    add_and_remove_from_cart(actions, product).await?;

    actions.create_cart_actions().select_place_order().await?;

    let order = actions.create_place_order_actions();
    order.fill_order_form(customer).await?;
    order.select_purchase().await?;
    order.is_thank_you_message_displayed().await
}
