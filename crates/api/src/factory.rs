//! Wiring for controllers and services

use shopcheck_common::{CheckResult, SuiteConfig};

use crate::client::ApiClient;
use crate::controllers::{JsonPlaceholderController, LlmController};
use crate::services::PostService;

/// The two clients a case needs, built from configuration
#[derive(Debug, Clone)]
pub struct ApiClients {
    pub api: ApiClient,
    pub llm: ApiClient,
}

impl ApiClients {
    pub fn from_config(config: &SuiteConfig) -> CheckResult<Self> {
        Ok(Self {
            api: ApiClient::for_api(&config.api)?,
            llm: ApiClient::for_llm(&config.llm)?,
        })
    }
}

/// Hands out controllers and services bound to borrowed clients.
///
/// Every call returns a fresh wrapper over the same clients.
#[derive(Debug, Clone, Copy)]
pub struct ServiceFactory<'a> {
    api: &'a ApiClient,
    llm: &'a ApiClient,
}

impl<'a> ServiceFactory<'a> {
    pub fn new(api: &'a ApiClient, llm: &'a ApiClient) -> Self {
        Self { api, llm }
    }

    pub fn from_clients(clients: &'a ApiClients) -> Self {
        Self::new(&clients.api, &clients.llm)
    }

    pub fn create_posts_controller(&self) -> JsonPlaceholderController<'a> {
        JsonPlaceholderController::new(self.api)
    }

    pub fn create_post_service(&self) -> PostService<'a> {
        PostService::new(self.create_posts_controller())
    }

    pub fn create_llm_controller(&self) -> LlmController<'a> {
        LlmController::new(self.llm)
    }
}
