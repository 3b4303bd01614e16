//! Post workflows spanning several endpoint calls
//!
//! A workflow only asserts what it needs to carry on (a created id before
//! reusing it, for instance) and hands back every raw response so a test can
//! check anything else itself.

use tracing::debug;

use shopcheck_common::{CheckError, CheckResult};

use crate::client::ApiResponse;
use crate::controllers::JsonPlaceholderController;
use crate::factories::{DataFactory, PostOverrides};
use crate::models::{Comment, Post};
use crate::validators::response::{validate_not_found, validate_status, validate_success};

#[derive(Debug, Clone)]
pub struct PostWithComments {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub post_response: ApiResponse,
    pub comment_responses: Vec<ApiResponse>,
}

#[derive(Debug, Clone)]
pub struct UpdatedPost {
    pub original: Post,
    pub updated: Post,
    pub create_response: ApiResponse,
    pub update_response: ApiResponse,
    pub verify_response: ApiResponse,
}

#[derive(Debug, Clone)]
pub struct Cleanup {
    pub delete_response: ApiResponse,
    pub verify_response: ApiResponse,
}

#[derive(Debug, Clone)]
pub struct UserPosts {
    pub posts: Vec<Post>,
    pub responses: Vec<ApiResponse>,
}

#[derive(Debug, Clone)]
pub struct ValidatedUserPosts {
    pub posts: Vec<Post>,
    pub response: ApiResponse,
    pub all_belong_to_user: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PostService<'a> {
    api: JsonPlaceholderController<'a>,
}

impl<'a> PostService<'a> {
    pub fn new(api: JsonPlaceholderController<'a>) -> Self {
        Self { api }
    }

    /// Create a post, then `count` comments attached to it
    pub async fn create_post_with_comments(&self, count: usize) -> CheckResult<PostWithComments> {
        let (post, post_response) = self.create(DataFactory::create_post()).await?;
        let post_id = created_id(&post)?;

        let mut comments = Vec::with_capacity(count);
        let mut comment_responses = Vec::with_capacity(count);
        for _ in 0..count {
            let comment = DataFactory::create_comment(post_id);
            let response = self.api.create_comment(&comment).await?;
            validate_status(&response, 201)?;

            let id = response.value()?.get("id").and_then(|v| v.as_u64());
            comments.push(Comment { id, ..comment });
            comment_responses.push(response);
        }
        debug!("post {} created with {} comments", post_id, comments.len());

        Ok(PostWithComments {
            post,
            comments,
            post_response,
            comment_responses,
        })
    }

    /// Create a post, replace it and read it back.
    ///
    /// The update status is returned as-is; the mock API answers PUT on
    /// posts it did not persist with a 500.
    pub async fn create_update_and_verify_post(&self) -> CheckResult<UpdatedPost> {
        let (original, create_response) = self.create(DataFactory::create_post()).await?;
        let id = created_id(&original)?;

        let updated = DataFactory::create_post_with(PostOverrides {
            id: Some(id),
            user_id: Some(original.user_id),
            ..Default::default()
        });
        let update_response = self.api.update_post(id, &updated).await?;

        let verify_response = self.api.get_post_by_id(id).await?;
        validate_success(&verify_response)?;

        Ok(UpdatedPost {
            original,
            updated,
            create_response,
            update_response,
            verify_response,
        })
    }

    /// Delete the post and check it is gone
    pub async fn cleanup_post(&self, post_id: u64) -> CheckResult<Cleanup> {
        let delete_response = self.api.delete_post(post_id).await?;
        validate_success(&delete_response)?;

        let verify_response = self.api.get_post_by_id(post_id).await?;
        validate_not_found(&verify_response)?;

        Ok(Cleanup {
            delete_response,
            verify_response,
        })
    }

    pub async fn create_user_posts(&self, user_id: u64, count: usize) -> CheckResult<UserPosts> {
        let mut posts = Vec::with_capacity(count);
        let mut responses = Vec::with_capacity(count);
        for _ in 0..count {
            let post = DataFactory::create_post_with(PostOverrides {
                user_id: Some(user_id),
                ..Default::default()
            });
            let (post, response) = self.create(post).await?;
            posts.push(post);
            responses.push(response);
        }
        Ok(UserPosts { posts, responses })
    }

    pub async fn get_and_validate_user_posts(
        &self,
        user_id: u64,
    ) -> CheckResult<ValidatedUserPosts> {
        let response = self.api.get_posts_by_user(user_id).await?;
        validate_success(&response)?;

        let posts: Vec<Post> = response.json()?;
        let all_belong_to_user = posts.iter().all(|post| post.user_id == user_id);

        Ok(ValidatedUserPosts {
            posts,
            response,
            all_belong_to_user,
        })
    }

    /// POST the post, require 201 and return it with the assigned id
    async fn create(&self, post: Post) -> CheckResult<(Post, ApiResponse)> {
        let response = self.api.create_post(&post).await?;
        validate_status(&response, 201)?;

        let id = response.value()?.get("id").and_then(|v| v.as_u64());
        Ok((Post { id, ..post }, response))
    }
}

fn created_id(post: &Post) -> CheckResult<u64> {
    post.id
        .ok_or_else(|| CheckError::assertion(format!("created post {:?} has no id", post.title)))
}
