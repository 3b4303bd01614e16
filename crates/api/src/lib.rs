//! Shopcheck API checks
//!
//! HTTP checks against the JSONPlaceholder mock REST API and a local
//! OpenAI-compatible completion server.
//!
//! # Architecture
//!
//! ```text
//! scenarios    registered TestCases
//!     │
//! factory      ServiceFactory: controllers and services over shared clients
//!     │
//! services     multi-call workflows (post with comments, bulk create)
//!     │
//! controllers  one method per endpoint, raw ApiResponse back
//!     │
//! client       reqwest wrapper with request/response logging
//! ```
//!
//! Payloads come from [`factories`] and responses are judged by
//! [`validators`]; neither touches the network.

pub mod client;
pub mod controllers;
pub mod factories;
pub mod factory;
pub mod models;
pub mod scenarios;
pub mod services;
pub mod validators;

pub use client::{ApiClient, ApiResponse};
pub use controllers::{JsonPlaceholderController, LlmController};
pub use factories::{DataFactory, InvalidPost, LlmDataFactory, PostOverrides};
pub use factory::{ApiClients, ServiceFactory};
pub use models::{
    ChatMessage, Choice, Comment, CompletionRequest, CompletionResponse, ModelInfo, ModelList,
    Post, Role, Usage, User,
};
pub use services::PostService;
