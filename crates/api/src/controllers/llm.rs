use serde_json::Value;

use shopcheck_common::CheckResult;

use crate::client::{ApiClient, ApiResponse};
use crate::models::CompletionRequest;

/// Endpoints of an OpenAI-compatible server
#[derive(Debug, Clone, Copy)]
pub struct LlmController<'a> {
    client: &'a ApiClient,
}

impl<'a> LlmController<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /models
    pub async fn list_models(&self) -> CheckResult<ApiResponse> {
        self.client.get("models").await
    }

    /// POST /chat/completions
    pub async fn chat_completion(&self, request: &CompletionRequest) -> CheckResult<ApiResponse> {
        self.client.post_json("chat/completions", request).await
    }

    /// POST /chat/completions with an arbitrary, possibly malformed, payload
    pub async fn chat_completion_value(&self, payload: &Value) -> CheckResult<ApiResponse> {
        self.client.post_json("chat/completions", payload).await
    }

    /// POST /chat/completions with a body that need not be JSON at all
    pub async fn chat_completion_raw(&self, body: &str) -> CheckResult<ApiResponse> {
        self.client.post_raw("chat/completions", body).await
    }
}
