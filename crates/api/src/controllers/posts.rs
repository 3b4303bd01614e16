use shopcheck_common::CheckResult;

use crate::client::{ApiClient, ApiResponse};
use crate::models::{Comment, Post};

/// Endpoints of the mock REST API
#[derive(Debug, Clone, Copy)]
pub struct JsonPlaceholderController<'a> {
    client: &'a ApiClient,
}

impl<'a> JsonPlaceholderController<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /posts
    pub async fn get_all_posts(&self) -> CheckResult<ApiResponse> {
        self.client.get("posts").await
    }

    /// GET /posts/{id}
    pub async fn get_post_by_id(&self, id: u64) -> CheckResult<ApiResponse> {
        self.client.get(&format!("posts/{}", id)).await
    }

    /// GET /posts?userId={id}
    pub async fn get_posts_by_user(&self, user_id: u64) -> CheckResult<ApiResponse> {
        self.client
            .get_with_query("posts", &[("userId", user_id.to_string())])
            .await
    }

    /// POST /posts
    pub async fn create_post(&self, post: &Post) -> CheckResult<ApiResponse> {
        self.client.post_json("posts", post).await
    }

    /// PUT /posts/{id}
    pub async fn update_post(&self, id: u64, post: &Post) -> CheckResult<ApiResponse> {
        self.client.put_json(&format!("posts/{}", id), post).await
    }

    /// DELETE /posts/{id}
    pub async fn delete_post(&self, id: u64) -> CheckResult<ApiResponse> {
        self.client.delete(&format!("posts/{}", id)).await
    }

    /// GET /users
    pub async fn get_all_users(&self) -> CheckResult<ApiResponse> {
        self.client.get("users").await
    }

    /// GET /users/{id}
    pub async fn get_user_by_id(&self, id: u64) -> CheckResult<ApiResponse> {
        self.client.get(&format!("users/{}", id)).await
    }

    /// GET /comments?postId={id}
    pub async fn get_comments_by_post(&self, post_id: u64) -> CheckResult<ApiResponse> {
        self.client
            .get_with_query("comments", &[("postId", post_id.to_string())])
            .await
    }

    /// POST /comments
    pub async fn create_comment(&self, comment: &Comment) -> CheckResult<ApiResponse> {
        self.client.post_json("comments", comment).await
    }
}
