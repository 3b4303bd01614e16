//! Element locators
//!
//! Locators are plain data. The driver script resolves them against the live
//! page, mirroring Playwright's `getByRole`, `locator`, `getByText`,
//! `filter` and `nth`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a name or text is compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum TextMatch {
    /// Whole string, case-sensitive
    Exact(String),
    /// Case-insensitive substring
    Contains(String),
    /// Whole string, case-insensitive, surrounding whitespace ignored
    IgnoreCase(String),
}

impl TextMatch {
    pub fn value(&self) -> &str {
        match self {
            TextMatch::Exact(v) | TextMatch::Contains(v) | TextMatch::IgnoreCase(v) => v,
        }
    }

    /// Apply the same comparison locally
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextMatch::Exact(v) => text == v,
            TextMatch::Contains(v) => text.to_lowercase().contains(&v.to_lowercase()),
            TextMatch::IgnoreCase(v) => text.trim().eq_ignore_ascii_case(v.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AriaRole {
    Link,
    Button,
    Heading,
    Cell,
    Row,
    Navigation,
    Dialog,
}

impl AriaRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AriaRole::Link => "link",
            AriaRole::Button => "button",
            AriaRole::Heading => "heading",
            AriaRole::Cell => "cell",
            AriaRole::Row => "row",
            AriaRole::Navigation => "navigation",
            AriaRole::Dialog => "dialog",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    Role { role: AriaRole, name: TextMatch },
    Css { selector: String },
    Text { text: TextMatch },
    Filter { base: Box<Locator>, has_text: TextMatch },
    Within { parent: Box<Locator>, child: Box<Locator> },
    Nth { base: Box<Locator>, index: usize },
}

impl Locator {
    /// Role with an accessible name containing `name`
    pub fn by_role(role: AriaRole, name: &str) -> Self {
        Locator::Role {
            role,
            name: TextMatch::Contains(name.to_string()),
        }
    }

    pub fn by_role_exact(role: AriaRole, name: &str) -> Self {
        Locator::Role {
            role,
            name: TextMatch::Exact(name.to_string()),
        }
    }

    /// Role whose whole name equals `name` ignoring case
    pub fn by_role_ignore_case(role: AriaRole, name: &str) -> Self {
        Locator::Role {
            role,
            name: TextMatch::IgnoreCase(name.to_string()),
        }
    }

    pub fn css(selector: &str) -> Self {
        Locator::Css {
            selector: selector.to_string(),
        }
    }

    pub fn text_exact(text: &str) -> Self {
        Locator::Text {
            text: TextMatch::Exact(text.to_string()),
        }
    }

    /// Narrow to elements containing `text`
    pub fn has_text(self, text: &str) -> Self {
        Locator::Filter {
            base: Box::new(self),
            has_text: TextMatch::Contains(text.to_string()),
        }
    }

    /// Resolve this locator inside `parent`
    pub fn within(self, parent: Locator) -> Self {
        Locator::Within {
            parent: Box::new(parent),
            child: Box::new(self),
        }
    }

    pub fn nth(self, index: usize) -> Self {
        Locator::Nth {
            base: Box::new(self),
            index,
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Exact(v) => write!(f, "\"{}\"", v),
            TextMatch::Contains(v) => write!(f, "~\"{}\"", v),
            TextMatch::IgnoreCase(v) => write!(f, "\"{}\"i", v),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Role { role, name } => write!(f, "role={}[name={}]", role.as_str(), name),
            Locator::Css { selector } => f.write_str(selector),
            Locator::Text { text } => write!(f, "text={}", text),
            Locator::Filter { base, has_text } => write!(f, "{} >> has-text={}", base, has_text),
            Locator::Within { parent, child } => write!(f, "{} >> {}", parent, child),
            Locator::Nth { base, index } => write!(f, "{} >> nth={}", base, index),
        }
    }
}
