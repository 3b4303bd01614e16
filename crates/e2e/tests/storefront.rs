//! Storefront action and flow tests
//!
//! Runs the action layer and flows against an in-memory model of the demo
//! storefront instead of a real browser.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use shopcheck_common::{CheckError, CheckResult, Filter, Project, RetryStrategy};
use shopcheck_e2e::fixtures::{product, CustomerData, MenuOption, ProductCatalog};
use shopcheck_e2e::locator::{AriaRole, Locator, TextMatch};
use shopcheck_e2e::{flows, scenarios, ActionFactory, BrowserDriver, DriverCommand, Session};

#[derive(Debug, Clone, PartialEq)]
enum Screen {
    Home,
    Product(String),
    Cart,
}

#[derive(Debug)]
struct Storefront {
    screen: Screen,
    cart: Vec<String>,
    dialogs: Vec<String>,
    filled: Vec<(String, String)>,
    order_confirmed: bool,
    closed: bool,
    commands: usize,
    /// Price shown for every product, when set
    price_override: Option<u32>,
}

/// Scripted driver modelling just enough of the storefront
struct FakeStorefront {
    state: Mutex<Storefront>,
}

impl FakeStorefront {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(Storefront {
                screen: Screen::Home,
                cart: Vec::new(),
                dialogs: Vec::new(),
                filled: Vec::new(),
                order_confirmed: false,
                closed: false,
                commands: 0,
                price_override: None,
            }),
        })
    }

    fn with_price(price: u32) -> Arc<Self> {
        let fake = Self::new();
        fake.state.lock().price_override = Some(price);
        fake
    }

    fn catalog_name(name: &str) -> Option<String> {
        ProductCatalog::get()
            .ok()?
            .find(name)
            .map(|p| p.name.clone())
    }

    fn price_of(&self, state: &Storefront, name: &str) -> Option<u32> {
        if let Some(price) = state.price_override {
            return Some(price);
        }
        ProductCatalog::get().ok()?.find(name).map(|p| p.price)
    }

    fn click(&self, state: &mut Storefront, locator: &Locator) -> CheckResult<()> {
        match locator {
            Locator::Role {
                role: AriaRole::Link,
                name: TextMatch::Exact(label),
            } => match label.as_str() {
                "Add to cart" => {
                    if let Screen::Product(name) = &state.screen {
                        state.cart.push(name.clone());
                        state.dialogs.push("Product added.".to_string());
                    }
                }
                "Cart" => state.screen = Screen::Cart,
                "Home" => state.screen = Screen::Home,
                _ => {}
            },
            Locator::Role { role: AriaRole::Link, name: TextMatch::Contains(_) } => {
                state.screen = Screen::Home;
            }
            Locator::Role { role: AriaRole::Link, name: TextMatch::IgnoreCase(name) } => {
                let name = Self::catalog_name(name).ok_or_else(|| {
                    CheckError::Timeout(format!("click: no product link {}", name))
                })?;
                state.screen = Screen::Product(name);
            }
            Locator::Within { parent, child } => {
                if let (
                    Locator::Filter { has_text, .. },
                    Locator::Role { name: TextMatch::Exact(label), .. },
                ) = (parent.as_ref(), child.as_ref())
                {
                    if label == "Delete" {
                        let before = state.cart.len();
                        state.cart.retain(|item| !has_text.matches(item));
                        if state.cart.len() == before {
                            return Err(CheckError::Timeout("click: Delete link not found".into()));
                        }
                    }
                }
            }
            Locator::Role { role: AriaRole::Button, name } => match name.value() {
                "Purchase" => state.order_confirmed = true,
                "Send message" => state.dialogs.push("Thanks for the message!!".to_string()),
                "Log in" => state.dialogs.push("User does not exist.".to_string()),
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn text_content(&self, state: &Storefront, locator: &Locator) -> Option<String> {
        match (locator, &state.screen) {
            (Locator::Role { role: AriaRole::Heading, name }, Screen::Product(current))
                if name.matches(current) =>
            {
                Some(current.clone())
            }
            (Locator::Filter { base, has_text }, Screen::Product(current)) => {
                let price = self.price_of(state, current)?;
                let shown = format!("\n          ${} *includes tax\n        ", price);
                let is_price = matches!(
                    base.as_ref(),
                    Locator::Css { selector } if selector == ".price-container"
                );
                (is_price && has_text.matches(&shown)).then_some(shown)
            }
            (Locator::Role { role: AriaRole::Cell, name }, Screen::Cart) => {
                state.cart.iter().find(|item| name.matches(item)).cloned()
            }
            (Locator::Css { selector }, Screen::Product(current))
                if selector == "#more-information p" =>
            {
                ProductCatalog::get()
                    .ok()?
                    .find(current)
                    .map(|p| format!("Product description\n{}", p.description))
            }
            _ => None,
        }
    }

    fn is_visible(&self, state: &Storefront, locator: &Locator) -> bool {
        match locator {
            Locator::Role { role: AriaRole::Cell, name } => {
                state.screen == Screen::Cart && state.cart.iter().any(|item| name.matches(item))
            }
            Locator::Role {
                role: AriaRole::Heading,
                name,
            } if name.value().starts_with("Thank you") => state.order_confirmed,
            Locator::Css { selector } => selector.ends_with(".modal-title"),
            other => self.text_content(state, other).is_some(),
        }
    }
}

#[async_trait]
impl BrowserDriver for FakeStorefront {
    async fn execute(&self, command: DriverCommand) -> CheckResult<Value> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(CheckError::Playwright("driver process exited".into()));
        }
        state.commands += 1;

        match command {
            DriverCommand::Goto { .. } => {
                state.screen = Screen::Home;
                Ok(Value::Null)
            }
            DriverCommand::Click { locator, .. } => {
                self.click(&mut state, &locator)?;
                Ok(Value::Null)
            }
            DriverCommand::Fill { locator, value, .. } => {
                state.filled.push((locator.to_string(), value));
                Ok(Value::Null)
            }
            DriverCommand::TextContent { locator } => {
                Ok(self.text_content(&state, &locator).map(Value::String).unwrap_or(Value::Null))
            }
            DriverCommand::IsVisible { locator } => Ok(json!(self.is_visible(&state, &locator))),
            DriverCommand::Count { .. } => Ok(json!(0)),
            DriverCommand::Attribute { .. } => Ok(Value::Null),
            DriverCommand::Title => Ok(json!("STORE")),
            DriverCommand::Url => Ok(json!(match state.screen {
                Screen::Cart => "https://www.demoblaze.com/cart.html",
                _ => "https://www.demoblaze.com/index.html",
            })),
            DriverCommand::ArmDialog => {
                state.dialogs.clear();
                Ok(Value::Null)
            }
            DriverCommand::DialogMessage => Ok(state
                .dialogs
                .last()
                .map(|m| json!(m))
                .unwrap_or(Value::Null)),
            DriverCommand::Screenshot { .. } => Ok(Value::Null),
            DriverCommand::Close => {
                state.closed = true;
                Ok(Value::Null)
            }
        }
    }
}

fn session(fake: &Arc<FakeStorefront>) -> Session {
    let driver: Arc<dyn BrowserDriver> = fake.clone();
    Session::with_driver(driver, "https://www.demoblaze.com/", Duration::from_millis(300))
        .with_poll_interval(Duration::from_millis(20))
}

#[tokio::test]
async fn test_add_and_remove_samsung_galaxy_s6() {
    let fake = FakeStorefront::new();
    let session = session(&fake);
    let actions = ActionFactory::new(&session);
    let phone = product("Samsung Galaxy S6").unwrap();

    flows::add_product_to_cart(&actions, &phone).await.unwrap();
    assert_eq!(fake.state.lock().cart, vec!["Samsung galaxy s6".to_string()]);

    actions
        .create_home_actions()
        .select_menu_option(MenuOption::Cart)
        .await
        .unwrap();
    let cart = actions.create_cart_actions();
    cart.check_product_is_displayed("Samsung Galaxy S6").await.unwrap();

    cart.delete_product_from_cart("Samsung Galaxy S6").await.unwrap();
    assert!(fake.state.lock().cart.is_empty());
    assert!(!session
        .is_visible(&Locator::by_role_ignore_case(AriaRole::Cell, "Samsung Galaxy S6"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_purchase_flow_fills_customer_data() {
    let fake = FakeStorefront::new();
    let session = session(&fake);
    let actions = ActionFactory::new(&session);
    let phone = product("Samsung galaxy s6").unwrap();

    flows::purchase_product(&actions, &phone, &CustomerData::john())
        .await
        .unwrap();

    let state = fake.state.lock();
    assert!(state.order_confirmed);
    let values: Vec<&str> = state.filled.iter().map(|(_, v)| v.as_str()).collect();
    assert_eq!(values, vec!["John Doe", "USA", "New York", "1234567890123456", "12", "2025"]);
    assert!(state.filled[0].0.contains("#name"));
}

#[tokio::test(start_paused = true)]
async fn test_wrong_price_fails_as_assertion() {
    let fake = FakeStorefront::with_price(999);
    let session = session(&fake);
    let actions = ActionFactory::new(&session);
    let phone = product("Nokia lumia 1520").unwrap();

    let err = flows::add_product_to_cart(&actions, &phone).await.unwrap_err();
    assert!(err.is_assertion(), "unexpected error: {}", err);

    let message = err.to_string();
    assert!(message.contains("$820 *includes tax"), "{}", message);
    assert!(!RetryStrategy::Aggressive.should_retry(&message, 0));

    // Fail fast: nothing was added
    assert!(fake.state.lock().cart.is_empty());
}

#[tokio::test]
async fn test_driver_timeout_is_retryable() {
    let fake = FakeStorefront::new();
    let session = session(&fake);
    let home = ActionFactory::new(&session).create_home_actions();

    let err = home.select_product("Commodore 64").await.unwrap_err();
    assert!(matches!(err, CheckError::Timeout(_)));
    assert!(RetryStrategy::Conservative.should_retry(&err.to_string(), 0));
}

#[tokio::test]
async fn test_factory_wrappers_share_session() {
    let fake = FakeStorefront::new();
    let session = session(&fake);
    let factory = ActionFactory::new(&session);

    factory.create_home_actions().check_home_page_title().await.unwrap();
    factory.create_common_actions().click_menu_option(MenuOption::Cart).await.unwrap();
    factory.create_common_actions().expect_url("cart\\.html").await.unwrap();

    assert!(std::ptr::eq(factory.session(), &session));
    assert_eq!(fake.state.lock().commands, 3);
    assert!(!fake.state.lock().closed);
}

#[tokio::test]
async fn test_contact_form_and_dialog() {
    let fake = FakeStorefront::new();
    let session = session(&fake);
    let contact = ActionFactory::new(&session).create_contact_actions();

    contact.verify_contact_modal_visible().await.unwrap();
    contact
        .fill_contact_form("test@example.com", "Test User", "This is a test message")
        .await
        .unwrap();
    contact.send_message().await.unwrap();
    contact.check_message_sent_alert().await.unwrap();

    assert_eq!(fake.state.lock().filled.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_missing_dialog_reported() {
    let fake = FakeStorefront::new();
    let session = session(&fake);
    let signup = ActionFactory::new(&session).create_signup_actions();

    let err = signup.check_dialog_message("Sign up successful.").await.unwrap_err();
    assert!(err.is_assertion());
    assert!(err.to_string().contains("no dialog"));
}

#[tokio::test]
async fn test_product_description() {
    let fake = FakeStorefront::new();
    let session = session(&fake);
    let actions = ActionFactory::new(&session);
    let monitor = product("ASUS Full HD").unwrap();

    flows::add_product_to_cart(&actions, &monitor).await.unwrap();
    actions
        .create_product_actions()
        .check_product_description(&monitor.description)
        .await
        .unwrap();
}

#[test]
fn test_registered_cases() {
    let cases = scenarios::all().unwrap();
    let catalog = ProductCatalog::get().unwrap();
    let data_driven = catalog.phones.len() + catalog.monitors.len();

    assert_eq!(cases.len(), 12 + data_driven + 3);
    assert!(cases.iter().all(|c| c.project == Project::Browser));

    let skipped: Vec<_> = cases.iter().filter(|c| c.skip).collect();
    assert_eq!(skipped.len(), 3);
    assert!(skipped.iter().all(|c| c.has_tag("@accessibility")));

    let negative = Filter {
        tags: vec!["@negative".to_string()],
        ..Default::default()
    };
    assert_eq!(cases.iter().filter(|c| negative.matches(c)).count(), 1);

    let mut titles: Vec<String> = cases.iter().map(|c| c.title()).collect();
    titles.sort();
    titles.dedup();
    assert_eq!(titles.len(), cases.len(), "duplicate test titles");
}
