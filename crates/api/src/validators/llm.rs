//! Checks for OpenAI-style completion and model-list responses

use chrono::Utc;
use serde_json::Value;

use shopcheck_common::assert::{ensure, ensure_at_least, ensure_at_most, ensure_eq};
use shopcheck_common::{CheckError, CheckResult};

use crate::client::ApiResponse;
use crate::models::CompletionResponse;

/// Tokenizers may overshoot `max_tokens` slightly
pub const TOKEN_TOLERANCE: u64 = 5;

pub const DEFAULT_FINISH_REASONS: [&str; 3] = ["stop", "length", "content_filter"];

/// How far `created` may lag behind the local clock by default
pub const DEFAULT_MAX_AGE_SECONDS: i64 = 60;

/// Extra checks for [`validate_complete`]
#[derive(Debug, Clone, Default)]
pub struct CompleteOptions {
    pub max_tokens: Option<u32>,
    pub expected_model: Option<String>,
    pub allowed_finish_reasons: Option<Vec<String>>,
    pub max_age_seconds: Option<i64>,
}

fn require<'v>(value: &'v Value, path: &str, key: &str) -> CheckResult<&'v Value> {
    value.get(key).ok_or_else(|| {
        CheckError::assertion(format!("completion: missing property {}{}", path, key))
    })
}

/// Status 200 and every field of a chat completion present
pub fn validate_response_structure(response: &ApiResponse) -> CheckResult<CompletionResponse> {
    ensure_eq("completion status", response.status(), 200)?;
    let data = response.value()?;

    for key in ["id", "created", "model", "usage"] {
        require(&data, "", key)?;
    }
    let object = require(&data, "", "object")?.as_str();
    ensure_eq("completion object", object, Some("chat.completion"))?;

    let choices = require(&data, "", "choices")?
        .as_array()
        .filter(|choices| !choices.is_empty())
        .ok_or_else(|| CheckError::assertion("completion: choices must be a non-empty array"))?;

    let choice = &choices[0];
    for key in ["index", "message", "finish_reason"] {
        require(choice, "choices[0].", key)?;
    }
    let message = require(choice, "choices[0].", "message")?;
    require(message, "choices[0].message.", "role")?;
    ensure(
        require(message, "choices[0].message.", "content")?.is_string(),
        || "completion: choices[0].message.content must be a string".to_string(),
    )?;

    let usage = require(&data, "", "usage")?;
    for key in ["prompt_tokens", "completion_tokens", "total_tokens"] {
        require(usage, "usage.", key)?;
    }

    response.json()
}

/// `total_tokens == prompt_tokens + completion_tokens`
pub fn validate_token_usage(data: &CompletionResponse) -> CheckResult<()> {
    let usage = data.usage;
    let expected = usage
        .prompt_tokens
        .checked_add(usage.completion_tokens)
        .ok_or_else(|| {
            CheckError::assertion(format!(
                "token usage overflows: prompt_tokens {} + completion_tokens {}",
                usage.prompt_tokens, usage.completion_tokens
            ))
        })?;
    ensure_eq("total_tokens", usage.total_tokens, expected)
}

pub fn validate_max_tokens_respected(
    data: &CompletionResponse,
    max_tokens: u32,
    tolerance: u64,
) -> CheckResult<()> {
    let limit = u64::from(max_tokens);
    let used = data.usage.completion_tokens;
    ensure_at_most("completion_tokens", used, limit.saturating_add(tolerance))?;

    // Cut off by the limit means it got close to it
    if data.finish_reason() == Some("length") {
        ensure_at_least("completion_tokens", used, limit.saturating_sub(tolerance))?;
    }
    Ok(())
}

pub fn validate_content_not_empty(data: &CompletionResponse) -> CheckResult<()> {
    ensure(!data.content().trim().is_empty(), || {
        format!("completion {}: content is empty", data.id)
    })
}

/// Defaults to stop, length and content_filter
pub fn validate_finish_reason(
    data: &CompletionResponse,
    allowed: Option<&[String]>,
) -> CheckResult<()> {
    let reason = data.finish_reason().unwrap_or_default();
    let accepted = match allowed {
        Some(allowed) => allowed.iter().any(|r| r == reason),
        None => DEFAULT_FINISH_REASONS.contains(&reason),
    };
    ensure(accepted, || {
        let allowed = allowed
            .map(|a| a.join(", "))
            .unwrap_or_else(|| DEFAULT_FINISH_REASONS.join(", "));
        format!("finish_reason: expected one of [{}], got {:?}", allowed, reason)
    })
}

/// `created` is at most `max_age_seconds` old and no more than 5 s ahead
pub fn validate_timestamp(data: &CompletionResponse, max_age_seconds: i64) -> CheckResult<()> {
    let now = Utc::now().timestamp();
    ensure_at_least("created", data.created, now - max_age_seconds)?;
    ensure_at_most("created", data.created, now + 5)
}

pub fn validate_id_format(data: &CompletionResponse) -> CheckResult<()> {
    ensure(!data.id.trim().is_empty(), || "completion id is empty".to_string())
}

pub fn validate_model_name(data: &CompletionResponse, expected: Option<&str>) -> CheckResult<()> {
    ensure(!data.model.is_empty(), || "completion model is empty".to_string())?;
    match expected {
        Some(expected) => ensure_eq("model", data.model.as_str(), expected),
        None => Ok(()),
    }
}

/// Structure, content, token math, id and timestamp, then the optional
/// checks. Stops at the first failure.
pub fn validate_complete(
    response: &ApiResponse,
    options: &CompleteOptions,
) -> CheckResult<CompletionResponse> {
    let data = validate_response_structure(response)?;

    validate_content_not_empty(&data)?;
    validate_token_usage(&data)?;
    validate_id_format(&data)?;
    validate_timestamp(&data, options.max_age_seconds.unwrap_or(DEFAULT_MAX_AGE_SECONDS))?;

    if let Some(max_tokens) = options.max_tokens {
        validate_max_tokens_respected(&data, max_tokens, TOKEN_TOLERANCE)?;
    }
    if let Some(model) = &options.expected_model {
        validate_model_name(&data, Some(model.as_str()))?;
    }
    if let Some(allowed) = &options.allowed_finish_reasons {
        validate_finish_reason(&data, Some(allowed.as_slice()))?;
    }

    Ok(data)
}

/// Expected status with an `{error: {message, type}}` body
pub fn validate_error_response(response: &ApiResponse, expected_status: u16) -> CheckResult<()> {
    ensure_eq("error status", response.status(), expected_status)?;
    let data = response.value()?;
    let error = data.get("error").ok_or_else(|| {
        CheckError::assertion(format!("error body: missing property error in {}", data))
    })?;
    for key in ["message", "type"] {
        ensure(error.get(key).is_some(), || format!("error body: missing property error.{}", key))?;
    }
    Ok(())
}

/// `{object: "list", data: [{id, object: "model"}, ...]}` with at least one model
pub fn validate_models_list(response: &ApiResponse) -> CheckResult<()> {
    ensure_eq("models status", response.status(), 200)?;
    let data = response.value()?;

    ensure_eq("models object", data.get("object").and_then(Value::as_str), Some("list"))?;
    let models = data
        .get("data")
        .and_then(Value::as_array)
        .filter(|models| !models.is_empty())
        .ok_or_else(|| CheckError::assertion("models: data must be a non-empty array"))?;

    let first = &models[0];
    ensure(first.get("id").is_some(), || "models: data[0] has no id".to_string())?;
    ensure_eq("models data[0].object", first.get("object").and_then(Value::as_str), Some("model"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use serde_json::json;
    use std::time::Duration;

    fn response(status: u16, body: Value) -> ApiResponse {
        ApiResponse {
            method: "POST".into(),
            url: "http://localhost/v1/chat/completions".into(),
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
            elapsed: Duration::from_millis(40),
        }
    }

    fn completion(
        content: &str,
        finish_reason: &str,
        prompt: u64,
        completion: u64,
        total: u64,
    ) -> Value {
        json!({
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "created": Utc::now().timestamp(),
            "model": "zai-org/glm-4.7-flash",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": finish_reason
            }],
            "usage": {
                "prompt_tokens": prompt,
                "completion_tokens": completion,
                "total_tokens": total
            }
        })
    }

    #[test]
    fn test_well_formed_completion_passes() {
        let options = CompleteOptions {
            max_tokens: Some(10),
            expected_model: Some("zai-org/glm-4.7-flash".into()),
            allowed_finish_reasons: Some(vec!["stop".into(), "length".into()]),
            max_age_seconds: None,
        };
        let answer = response(200, completion("4", "stop", 20, 1, 21));
        let data = validate_complete(&answer, &options).unwrap();
        assert_eq!(data.content(), "4");
        assert_eq!(
            data.usage.total_tokens,
            data.usage.prompt_tokens + data.usage.completion_tokens
        );
    }

    #[test]
    fn test_token_math_violation() {
        let err = validate_complete(
            &response(200, completion("hi", "stop", 20, 5, 30)),
            &CompleteOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("total_tokens"), "{}", err);
    }

    #[test]
    fn test_overflowing_token_counts_fail_as_assertion() {
        let err = validate_complete(
            &response(200, completion("hi", "stop", u64::MAX, 1, 0)),
            &CompleteOptions::default(),
        )
        .unwrap_err();
        assert!(err.is_assertion(), "{}", err);
        assert!(err.to_string().contains("overflows"), "{}", err);
    }

    #[test]
    fn test_short_circuits_on_first_violation() {
        // Empty content is checked before the token math
        let err = validate_complete(
            &response(200, completion("  ", "stop", 1, 1, 99)),
            &CompleteOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("content is empty"), "{}", err);
    }

    #[test]
    fn test_structure_reports_missing_field() {
        let mut body = completion("ok", "stop", 1, 1, 2);
        body["usage"].as_object_mut().unwrap().remove("total_tokens");
        let err = validate_response_structure(&response(200, body)).unwrap_err();
        assert!(err.to_string().contains("usage.total_tokens"), "{}", err);

        let mut body = completion("ok", "stop", 1, 1, 2);
        body["object"] = json!("text_completion");
        assert!(validate_response_structure(&response(200, body)).is_err());

        let failed = response(500, completion("ok", "stop", 1, 1, 2));
        assert!(validate_response_structure(&failed).is_err());
    }

    #[test]
    fn test_max_tokens_window() {
        let parse = |body: Value| -> CompletionResponse { serde_json::from_value(body).unwrap() };

        let within = parse(completion("x", "stop", 5, 14, 19));
        assert!(validate_max_tokens_respected(&within, 10, TOKEN_TOLERANCE).is_ok());

        let over = parse(completion("x", "stop", 5, 16, 21));
        assert!(validate_max_tokens_respected(&over, 10, TOKEN_TOLERANCE).is_err());

        // A length cut-off far below the limit is suspicious
        let cut_short = parse(completion("x", "length", 5, 2, 7));
        assert!(validate_max_tokens_respected(&cut_short, 50, TOKEN_TOLERANCE).is_err());
    }

    #[test]
    fn test_finish_reason_and_timestamp() {
        let mut data: CompletionResponse =
            serde_json::from_value(completion("x", "length", 1, 1, 2)).unwrap();
        assert!(validate_finish_reason(&data, None).is_ok());
        assert!(validate_finish_reason(&data, Some(&["stop".to_string()][..])).is_err());

        assert!(validate_timestamp(&data, 60).is_ok());
        data.created -= 3600;
        assert!(validate_timestamp(&data, 60).is_err());
        data.created += 7200;
        assert!(validate_timestamp(&data, 60).is_err());
    }

    #[test]
    fn test_error_response_shape() {
        let body = json!({
            "error": {"message": "model not found", "type": "invalid_request_error"}
        });
        assert!(validate_error_response(&response(404, body.clone()), 404).is_ok());
        assert!(validate_error_response(&response(400, body), 404).is_err());
        assert!(validate_error_response(&response(404, json!({"detail": "x"})), 404).is_err());
    }

    #[test]
    fn test_models_list() {
        let ok = json!({
            "object": "list",
            "data": [{"id": "m", "object": "model", "owned_by": "me"}]
        });
        assert!(validate_models_list(&response(200, ok)).is_ok());

        let empty = json!({"object": "list", "data": []});
        assert!(validate_models_list(&response(200, empty)).is_err());
    }
}
