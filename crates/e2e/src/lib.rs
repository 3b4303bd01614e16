//! Shopcheck storefront checks
//!
//! Browser tests for the demo storefront, driven through Playwright.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  scenarios     registered TestCases, one session per case   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  flows         add-to-cart, add-and-remove, purchase        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  actions       one wrapper per screen, via ActionFactory    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  pages         locators only                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  session       primitives + auto-waiting expectations       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  playwright    node driver over JSON lines                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod actions;
pub mod fixtures;
pub mod flows;
pub mod locator;
pub mod pages;
pub mod playwright;
pub mod scenarios;
pub mod session;

pub use actions::ActionFactory;
pub use fixtures::{Category, CustomerData, MenuOption, Product, ProductCatalog, UserCredentials};
pub use locator::{AriaRole, Locator, TextMatch};
pub use playwright::{Browser, BrowserDriver, DriverCommand, PlaywrightConfig, PlaywrightDriver};
pub use session::Session;
