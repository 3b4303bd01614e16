//! REST and local LLM test cases

use chrono::Utc;
use futures::future::join_all;
use serde_json::json;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use shopcheck_common::assert::{
    ensure, ensure_at_least, ensure_at_most, ensure_contains, ensure_eq, ensure_one_of,
};
use shopcheck_common::{CheckError, CheckResult, Project, TestCase, TestContext};

use crate::client::ApiResponse;
use crate::factories::{DataFactory, InvalidPost, LlmDataFactory, PostOverrides};
use crate::factory::{ApiClients, ServiceFactory};
use crate::models::{ChatMessage, CompletionRequest, Post};
use crate::validators::llm::{self as llm_validator, TOKEN_TOLERANCE};
use crate::validators::response as validator;

const POSTS: &str = "Posts API";
const ERRORS: &str = "Error Handling";
const INTEGRATION: &str = "Posts Integration Tests";
const LOCAL_BASIC: &str = "Local API Basic Tests";
const LOCAL_VALIDATION: &str = "Local API Data Validation";
const DEMO_CONNECTION: &str = "LM Studio Connection Test";
const DEMO_ADVANCED: &str = "LM Studio Advanced Tests";

/// Resends after a 429 before giving up
const RATE_LIMIT_RETRIES: usize = 3;

/// Cases sharing one suite title, project and tag set
struct Suite {
    title: &'static str,
    project: Project,
    tags: &'static [&'static str],
}

impl Suite {
    const fn new(title: &'static str, project: Project, tags: &'static [&'static str]) -> Self {
        Self { title, project, tags }
    }

    fn case<F, Fut>(&self, name: &str, scenario: F) -> TestCase
    where
        F: Fn(ApiClients, TestContext) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = CheckResult<()>> + Send + 'static,
    {
        TestCase::new(self.title, name, self.project, move |ctx| {
            let scenario = scenario.clone();
            async move {
                let clients = ApiClients::from_config(ctx.config())?;
                scenario(clients, ctx).await
            }
        })
        .tagged(self.tags)
    }
}

const ACCEPTANCE: &[&str] = &["@acceptance", "@api"];
const NEGATIVE: &[&str] = &["@acceptance", "@api", "@negative"];
const INTEGRATION_TAGS: &[&str] = &["@integration", "@api"];
const LOCAL: &[&str] = &["@local"];
const DEMO: &[&str] = &["@demo"];

/// Every API case, both projects
pub fn all() -> Vec<TestCase> {
    let posts = Suite::new(POSTS, Project::Api, ACCEPTANCE);
    let errors = Suite::new(ERRORS, Project::Api, NEGATIVE);
    let integration = Suite::new(INTEGRATION, Project::Api, INTEGRATION_TAGS);
    let basic = Suite::new(LOCAL_BASIC, Project::LocalApi, LOCAL);
    let validation = Suite::new(LOCAL_VALIDATION, Project::LocalApi, LOCAL);
    let connection = Suite::new(DEMO_CONNECTION, Project::LocalApi, DEMO);
    let advanced = Suite::new(DEMO_ADVANCED, Project::LocalApi, DEMO);

    vec![
        posts.case("GET /posts - should return all posts", get_all_posts),
        posts.case("GET /posts/{id} - should return single post", get_single_post),
        posts.case("GET /posts?userId={id} - should return posts by user", get_posts_by_user),
        posts.case("POST /posts - should create new post", create_post),
        posts.case("PUT /posts/{id} - should update existing post", update_post),
        posts.case("DELETE /posts/{id} - should delete post", delete_post),
        errors.case("GET /posts/{invalid_id} - should handle invalid post ID", invalid_post_id),
        errors.case("GET /users/{invalid_id} - should handle invalid user ID", invalid_user_id),
        errors.case("POST /posts - should handle invalid data", empty_post_accepted),
        integration.case(
            "Complete workflow: Create post with comments",
            post_with_five_comments,
        ),
        integration.case("Complete workflow: Create and verify post", post_with_three_comments),
        integration.case("Bulk operation: Create 10 posts for user", bulk_user_posts),
        integration.case("Data-driven: Multiple post variations", post_variations),
        integration.case("Negative: Invalid post data variations", invalid_post_variations),
        basic.case("API health check - List models endpoint", list_models),
        basic.case("Simple completion - Single prompt", simple_completion),
        basic.case("Response structure validation", response_structure),
        basic.case("Error handling - Invalid model", invalid_model),
        basic.case("Token usage tracking", token_usage),
        basic.case("Multi-turn conversation with context", multi_turn),
        basic.case("System prompt configuration", system_prompt),
        basic.case("Performance - Response time check", response_time),
        validation.case("Max tokens boundary - Respects limit", max_tokens_boundary),
        validation.case("Temperature variations - Different values", temperature_variations),
        validation.case("Empty message handling", empty_message),
        validation.case("Long prompt handling", long_prompt),
        validation.case("Special characters in prompt", special_characters),
        validation.case("Multiple messages in conversation", multiple_messages),
        validation.case("Invalid JSON payload", invalid_json),
        validation.case("Missing required fields", missing_fields),
        validation.case("Finish reason validation", finish_reason),
        validation.case("ID uniqueness", id_uniqueness),
        validation.case("Created timestamp is recent", timestamp_recent),
        validation.case("Concurrent request handling", concurrent_requests),
        connection.case("Verify local API is accessible", list_models),
        connection.case("Simple chat completion test", greeting),
        advanced.case("Batch processing - Multiple prompts in sequence", batch_prompts),
        advanced.case("Edge cases - Unusual prompt content", edge_cases),
        advanced.case("Performance - Scenario response times", performance_scenarios),
        advanced.case("Stress batch - Distinct prompts in sequence", stress_batch),
    ]
}

// Posts API

async fn get_all_posts(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();

    let response = ctx.step("When user fetches all posts", api.get_all_posts()).await?;
    ctx.step("Then response should be successful", async {
        validator::validate_success(&response)?;
        validator::validate_json(&response)
    })
    .await?;
    ctx.step("And response should contain array of posts", async {
        validator::validate_array_length(&response, 100)
    })
    .await
}

async fn get_single_post(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();

    let response = ctx.step("When user fetches post with id 1", api.get_post_by_id(1)).await?;
    ctx.step("Then response should be successful", async { validator::validate_success(&response) })
        .await?;
    ctx.step("And response should contain correct post data", async {
        for key in ["id", "title", "body"] {
            validator::validate_body_contains_key(&response, key)?;
        }
        Ok(())
    })
    .await
}

async fn get_posts_by_user(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();

    let response = ctx.step("When user fetches posts for user 1", api.get_posts_by_user(1)).await?;
    ctx.step("Then response should be successful", async { validator::validate_success(&response) })
        .await?;
    ctx.step("And all posts should belong to user 1", async {
        let posts: Vec<Post> = response.json()?;
        for post in &posts {
            ensure_eq(&format!("post {:?} userId", post.id), post.user_id, 1)?;
        }
        Ok(())
    })
    .await
}

async fn create_post(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();
    let new_post = Post {
        id: None,
        user_id: 1,
        title: "Test Post Title".to_string(),
        body: "Test post body content".to_string(),
    };

    let response = ctx.step("When user creates a new post", api.create_post(&new_post)).await?;
    ctx.step("Then response should be created (201)", async {
        validator::validate_status(&response, 201)
    })
    .await?;
    ctx.step("And response should contain created post", async {
        validator::validate_body_matches(
            &response,
            &json!({"userId": new_post.user_id, "title": new_post.title, "body": new_post.body}),
        )?;
        validator::validate_body_contains_key(&response, "id")
    })
    .await
}

async fn update_post(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();
    let updated = Post {
        id: None,
        user_id: 1,
        title: "Updated Title".to_string(),
        body: "Updated body content".to_string(),
    };

    let response = ctx
        .step("When user updates post with id 1", api.update_post(1, &updated))
        .await?;
    ctx.step("Then response should be successful", async { validator::validate_success(&response) })
        .await?;
    ctx.step("And response should contain updated post", async {
        let expected = json!({"title": updated.title, "body": updated.body});
        validator::validate_body_matches(&response, &expected)
    })
    .await
}

async fn delete_post(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();

    let response = ctx.step("When user deletes post with id 1", api.delete_post(1)).await?;
    ctx.step("Then response should be successful", async { validator::validate_success(&response) })
        .await
}

// Error handling

async fn invalid_post_id(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();

    let response = ctx
        .step("When user fetches post with invalid id", api.get_post_by_id(999_999))
        .await?;
    ctx.step("Then response should be not found", async {
        validator::validate_not_found(&response)
    })
    .await
}

async fn invalid_user_id(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();

    let response = ctx
        .step("When user fetches user with invalid id", api.get_user_by_id(999_999))
        .await?;
    ctx.step("Then response should be not found", async {
        validator::validate_not_found(&response)
    })
    .await
}

async fn empty_post_accepted(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let api = ServiceFactory::from_clients(&clients).create_posts_controller();
    let empty = DataFactory::create_invalid_post(InvalidPost::Empty);

    let response = ctx
        .step("When user creates post with empty data", api.create_post(&empty))
        .await?;
    ctx.step("Then response should still be created (API accepts empty)", async {
        validator::validate_status(&response, 201)
    })
    .await
}

// Integration

async fn post_with_comments(
    clients: ApiClients,
    ctx: TestContext,
    count: usize,
) -> CheckResult<()> {
    let service = ServiceFactory::from_clients(&clients).create_post_service();

    let result = ctx
        .step(
            format!("When user creates post with {} comments", count),
            service.create_post_with_comments(count),
        )
        .await?;
    ctx.step("Then post should be created successfully", async {
        ensure(result.post.id.is_some(), || "created post has no id".to_string())?;
        ensure_contains("post title", &result.post.title, "Test Post Title")
    })
    .await?;
    ctx.step("And comments should be associated", async {
        ensure_eq("comment count", result.comments.len(), count)?;
        ensure_eq("comment responses", result.comment_responses.len(), count)?;
        for comment in &result.comments {
            ensure_eq("comment postId", Some(comment.post_id), result.post.id)?;
        }
        Ok(())
    })
    .await
}

async fn post_with_five_comments(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    post_with_comments(clients, ctx, 5).await
}

async fn post_with_three_comments(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    post_with_comments(clients, ctx, 3).await
}

async fn bulk_user_posts(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let service = ServiceFactory::from_clients(&clients).create_post_service();
    let user_id = 42;

    let result = ctx
        .step("When user creates 10 posts", service.create_user_posts(user_id, 10))
        .await?;
    ctx.step("Then all posts should be created", async {
        ensure_eq("posts", result.posts.len(), 10)?;
        ensure_eq("responses", result.responses.len(), 10)
    })
    .await?;
    ctx.step("And all posts should belong to user 42", async {
        ensure(result.posts.iter().all(|p| p.user_id == user_id), || {
            "a created post belongs to another user".to_string()
        })
    })
    .await
}

async fn post_variations(_clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    for (user_id, kind) in [(1, "standard"), (2, "premium"), (3, "admin")] {
        ctx.step(format!("Create {} post for user {}", kind, user_id), async {
            let post = DataFactory::create_post_with(PostOverrides {
                user_id: Some(user_id),
                title: Some(format!("{} Post", kind)),
                ..Default::default()
            });
            ensure_eq("userId", post.user_id, user_id)?;
            ensure_contains("title", &post.title, kind)
        })
        .await?;
    }
    Ok(())
}

async fn invalid_post_variations(_clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    for kind in InvalidPost::all() {
        ctx.step(format!("Test {} post data", kind), async {
            let post = DataFactory::create_invalid_post(kind);
            match kind {
                InvalidPost::Empty => {
                    ensure_eq("title", post.title.as_str(), "")?;
                    ensure_eq("body", post.body.as_str(), "")
                }
                InvalidPost::LongTitle => {
                    ensure_eq("title length", post.title.chars().count(), 300)
                }
                InvalidPost::MissingBody => ensure_eq("body", post.body.as_str(), ""),
            }
        })
        .await?;
    }
    Ok(())
}

// Local LLM

fn model(ctx: &TestContext) -> String {
    ctx.config().llm.model.clone()
}

fn ask(model: &str, prompt: &str, max_tokens: u32) -> CompletionRequest {
    CompletionRequest::new(model, vec![ChatMessage::user(prompt)]).max_tokens(max_tokens)
}

async fn list_models(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();

    let response = ctx.step("When the models are listed", llm.list_models()).await?;
    ctx.step("Then at least one model is available", async {
        llm_validator::validate_models_list(&response)
    })
    .await
}

async fn simple_completion(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request =
        ask(&model(&ctx), "What is 2+2? Answer with just the number.", 10).temperature(0.1);

    let response = ctx.step("When a single prompt is sent", llm.chat_completion(&request)).await?;
    ctx.step("Then a completion is returned", async {
        llm_validator::validate_response_structure(&response).map(|_| ())
    })
    .await
}

async fn response_structure(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask(&model(&ctx), "Hi", 10);

    let response = ctx.step("When a prompt is sent", llm.chat_completion(&request)).await?;
    ctx.step("Then the response has the full completion structure", async {
        let data = llm_validator::validate_response_structure(&response)?;
        llm_validator::validate_id_format(&data)?;
        llm_validator::validate_model_name(&data, None)
    })
    .await
}

async fn invalid_model(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask("invalid-model-name", "Hello", 10);

    let response = ctx
        .step("When an unknown model is requested", llm.chat_completion(&request))
        .await?;
    ctx.step("Then the server either falls back or rejects it", async {
        ensure_one_of("status", response.status(), &[200, 400, 404, 422])
    })
    .await
}

async fn token_usage(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask(&model(&ctx), "Count from 1 to 5", 50);

    let response = ctx.step("When a prompt is sent", llm.chat_completion(&request)).await?;
    ctx.step("Then token usage adds up", async {
        let data = llm_validator::validate_response_structure(&response)?;
        llm_validator::validate_token_usage(&data)
    })
    .await
}

async fn multi_turn(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = CompletionRequest::new(
        &model(&ctx),
        vec![
            ChatMessage::user("My name is Alice"),
            ChatMessage::assistant("Hello Alice! Nice to meet you."),
            ChatMessage::user("What is my name?"),
        ],
    )
    .max_tokens(30)
    .temperature(0.3);

    let response = ctx
        .step("When the conversation continues", llm.chat_completion(&request))
        .await?;
    ctx.step("Then the model remembers the name", async {
        let data = llm_validator::validate_response_structure(&response)?;
        ensure_contains("answer", &data.content().to_lowercase(), "alice")
    })
    .await
}

async fn system_prompt(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = LlmDataFactory::with_system_prompt(
        &model(&ctx),
        "You are a helpful assistant that always responds with \"Acknowledged\" \
         followed by the answer.",
        "Say hello",
    )
    .max_tokens(30)
    .temperature(0.3);

    let response = ctx.step("When a system prompt is set", llm.chat_completion(&request)).await?;
    ctx.step("Then the model answers", async {
        let data = llm_validator::validate_response_structure(&response)?;
        llm_validator::validate_content_not_empty(&data)
    })
    .await
}

async fn response_time(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask(&model(&ctx), "Quick test", 20).temperature(0.1);

    let response = ctx.step("When a short prompt is sent", llm.chat_completion(&request)).await?;
    ctx.step("Then it answers within 30 seconds", async {
        validator::validate_status(&response, 200)?;
        ensure_at_most("response time (ms)", response.elapsed().as_millis(), 30_000)
    })
    .await
}

async fn max_tokens_boundary(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let max_tokens = 10;
    let request = ask(&model(&ctx), "Write a long story about a dragon in a castle", max_tokens)
        .temperature(0.7);

    let response = ctx
        .step("When a long answer is requested", llm.chat_completion(&request))
        .await?;
    ctx.step("Then max_tokens is respected", async {
        let data = llm_validator::validate_response_structure(&response)?;
        llm_validator::validate_max_tokens_respected(&data, max_tokens, TOKEN_TOLERANCE)
    })
    .await
}

async fn temperature_variations(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let model = model(&ctx);

    let mut answers = Vec::new();
    for temperature in [0.0, 0.5, 1.0] {
        let request = ask(&model, "Describe a sunset in one word", 15).temperature(temperature);
        let answer = ctx
            .step(format!("When temperature is {}", temperature), async {
                let response = llm.chat_completion(&request).await?;
                let data = llm_validator::validate_response_structure(&response)?;
                llm_validator::validate_content_not_empty(&data)?;
                Ok::<_, CheckError>(data.content().to_string())
            })
            .await?;
        answers.push(answer);
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    ctx.step("Then every temperature produced an answer", async {
        ensure_eq("answers", answers.len(), 3)
    })
    .await
}

async fn empty_message(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask(&model(&ctx), "", 10);

    let response = ctx.step("When an empty message is sent", llm.chat_completion(&request)).await?;
    ctx.step("Then it is accepted or rejected cleanly", async {
        ensure_one_of("status", response.status(), &[200, 400])
    })
    .await
}

async fn long_prompt(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask(&model(&ctx), &"A".repeat(1000), 20);

    let response = ctx
        .step("When a 1000 character prompt is sent", llm.chat_completion(&request))
        .await?;
    ctx.step("Then it is tokenized and answered", async {
        let data = llm_validator::validate_response_structure(&response)?;
        ensure(data.usage.prompt_tokens > 100, || {
            format!("prompt_tokens: expected more than 100, got {}", data.usage.prompt_tokens)
        })
    })
    .await
}

async fn special_characters(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let model = model(&ctx);

    let prompts = [
        "Hello! @#$%^&*()",
        "Question: <tag> & \"quotes\"",
        "Emoji: 🎉🚀✨",
        "Unicode: ñ 中文 العربية",
    ];
    for prompt in prompts {
        let request = ask(&model, prompt, 10);
        ctx.step(format!("Prompt {:?} is accepted", prompt), async {
            let response: ApiResponse = llm.chat_completion(&request).await?;
            validator::validate_status(&response, 200)
        })
        .await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    Ok(())
}

async fn multiple_messages(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = CompletionRequest::new(
        &model(&ctx),
        vec![
            ChatMessage::system("You are a helpful assistant"),
            ChatMessage::user("Hello"),
            ChatMessage::assistant("Hi there! How can I help?"),
            ChatMessage::user("What is the weather?"),
        ],
    )
    .max_tokens(30);

    let response = ctx
        .step("When a four message conversation is sent", llm.chat_completion(&request))
        .await?;
    ctx.step("Then a completion is returned", async {
        llm_validator::validate_response_structure(&response).map(|_| ())
    })
    .await
}

async fn invalid_json(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();

    let response = ctx
        .step("When the body is not JSON", llm.chat_completion_raw("invalid json here"))
        .await?;
    ctx.step("Then it is rejected", async {
        ensure_one_of("status", response.status(), &[400, 422])
    })
    .await
}

async fn missing_fields(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let payload = json!({"max_tokens": 10});

    let response = ctx
        .step("When model and messages are missing", llm.chat_completion_value(&payload))
        .await?;
    ctx.step("Then it is rejected", async {
        ensure_one_of("status", response.status(), &[400, 422])
    })
    .await
}

async fn finish_reason(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask(&model(&ctx), "Say hello", 50);

    let response = ctx.step("When a prompt is sent", llm.chat_completion(&request)).await?;
    ctx.step("Then it stops normally or at the limit", async {
        let data = llm_validator::validate_response_structure(&response)?;
        let allowed = ["stop".to_string(), "length".to_string()];
        llm_validator::validate_finish_reason(&data, Some(&allowed[..]))
    })
    .await
}

async fn id_uniqueness(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let model = model(&ctx);

    let mut ids = Vec::new();
    for i in 0..3 {
        let request = ask(&model, &format!("Request {}", i), 10);
        let id = ctx
            .step(format!("When request {} is sent", i), async {
                let response = llm.chat_completion(&request).await?;
                Ok::<_, CheckError>(llm_validator::validate_response_structure(&response)?.id)
            })
            .await?;
        ids.push(id);
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    ctx.step("Then every completion id is distinct", async {
        let distinct: HashSet<&String> = ids.iter().collect();
        ensure_eq("distinct ids", distinct.len(), ids.len())
    })
    .await
}

async fn timestamp_recent(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask(&model(&ctx), "Hi", 10);

    let before = Utc::now().timestamp();
    let response = ctx.step("When a prompt is sent", llm.chat_completion(&request)).await?;
    let after = Utc::now().timestamp();

    ctx.step("Then created falls within the request window", async {
        let data = llm_validator::validate_response_structure(&response)?;
        ensure_at_least("created", data.created, before - 5)?;
        ensure_at_most("created", data.created, after + 5)
    })
    .await
}

async fn concurrent_requests(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let model = model(&ctx);
    let requests: Vec<CompletionRequest> = (0..3)
        .map(|i| ask(&model, &format!("Concurrent {}", i), 20))
        .collect();

    let responses = ctx
        .step("When three requests are sent at once", async {
            Ok::<_, CheckError>(join_all(requests.iter().map(|r| llm.chat_completion(r))).await)
        })
        .await?;

    ctx.step("Then at least two succeed", async {
        let succeeded = responses
            .iter()
            .filter(|r| matches!(r, Ok(response) if response.status() == 200))
            .count();
        ensure_at_least("successful responses", succeeded, 2)
    })
    .await
}

// LM Studio demo

async fn greeting(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let request = ask(&model(&ctx), "Say \"Hello from shopcheck!\" in exactly those words", 50)
        .temperature(0.1);

    let response = ctx.step("When a greeting is requested", llm.chat_completion(&request)).await?;
    ctx.step("Then the model answers with some text", async {
        let data = llm_validator::validate_response_structure(&response)?;
        llm_validator::validate_content_not_empty(&data)
    })
    .await
}

async fn batch_prompts(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let model = model(&ctx);
    let prompts = &LlmDataFactory::sample_prompts()[..3];

    let mut answers = Vec::new();
    for prompt in prompts {
        let request = ask(&model, prompt, 50).temperature(0.1);
        let answer = ctx
            .step(format!("When {:?} is sent", prompt), async {
                let mut response = llm.chat_completion(&request).await?;
                for _ in 0..RATE_LIMIT_RETRIES {
                    if response.status() != 429 {
                        break;
                    }
                    debug!("rate limited, resending {:?} in 1s", prompt);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    response = llm.chat_completion(&request).await?;
                }
                let data = llm_validator::validate_response_structure(&response)?;
                llm_validator::validate_content_not_empty(&data)?;
                Ok::<_, CheckError>(data.content().to_string())
            })
            .await?;
        answers.push(answer);
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    ctx.step("Then every prompt was answered", async {
        ensure_eq("answers", answers.len(), prompts.len())
    })
    .await
}

async fn edge_cases(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();

    for scenario in LlmDataFactory::edge_case_scenarios(&model(&ctx)) {
        let title = format!("{}: {}", scenario.name, scenario.expected_behavior);
        ctx.step(title, async {
            let response = llm.chat_completion(&scenario.request).await?;
            ensure_at_most("response time", response.elapsed(), scenario.time_limit)?;
            if scenario.request.messages.iter().all(|m| m.content.is_empty()) {
                return ensure_one_of("status", response.status(), &[200, 400, 422]);
            }
            llm_validator::validate_response_structure(&response).map(|_| ())
        })
        .await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    Ok(())
}

async fn performance_scenarios(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();

    for scenario in LlmDataFactory::performance_scenarios(&model(&ctx)) {
        let title = format!("{}: {}", scenario.name, scenario.expected_behavior);
        ctx.step(title, async {
            let response = llm.chat_completion(&scenario.request).await?;
            let data = llm_validator::validate_response_structure(&response)?;
            llm_validator::validate_content_not_empty(&data)?;
            if let Some(max_tokens) = scenario.request.max_tokens {
                llm_validator::validate_max_tokens_respected(&data, max_tokens, TOKEN_TOLERANCE)?;
            }
            debug!("{} answered in {:?}", scenario.name, response.elapsed());
            ensure_at_most("response time", response.elapsed(), scenario.time_limit)
        })
        .await?;
    }
    Ok(())
}

async fn stress_batch(clients: ApiClients, ctx: TestContext) -> CheckResult<()> {
    let llm = ServiceFactory::from_clients(&clients).create_llm_controller();
    let batch = LlmDataFactory::stress_test_batch(&model(&ctx), 5);

    let mut ids = Vec::new();
    for (i, request) in batch.iter().enumerate() {
        let id = ctx
            .step(format!("When stress request {} is sent", i + 1), async {
                let response = llm.chat_completion(request).await?;
                Ok::<_, CheckError>(llm_validator::validate_response_structure(&response)?.id)
            })
            .await?;
        ids.push(id);
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    ctx.step("Then every request got its own completion", async {
        let distinct: HashSet<&String> = ids.iter().collect();
        ensure_eq("distinct ids", distinct.len(), batch.len())
    })
    .await
}
