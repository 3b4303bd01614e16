//! Generic HTTP response checks

use serde_json::Value;

use shopcheck_common::assert::{ensure, ensure_eq, json_matches};
use shopcheck_common::{CheckError, CheckResult};

use crate::client::ApiResponse;

fn what(response: &ApiResponse, field: &str) -> String {
    format!("{} {} {}", response.method, response.url, field)
}

pub fn validate_status(response: &ApiResponse, expected: u16) -> CheckResult<()> {
    ensure_eq(&what(response, "status"), response.status(), expected)
}

/// Any 2xx status
pub fn validate_success(response: &ApiResponse) -> CheckResult<()> {
    ensure(response.is_success(), || {
        format!("{}: expected 2xx, got {}", what(response, "status"), response.status())
    })
}

pub fn validate_not_found(response: &ApiResponse) -> CheckResult<()> {
    validate_status(response, 404)
}

/// Content type announces JSON
pub fn validate_json(response: &ApiResponse) -> CheckResult<()> {
    let content_type = response.header("content-type").unwrap_or_default();
    ensure(content_type.contains("application/json"), || {
        format!(
            "{}: expected application/json, got {:?}",
            what(response, "content-type"),
            content_type
        )
    })
}

pub fn validate_body_contains_key(response: &ApiResponse, key: &str) -> CheckResult<()> {
    let body = response.value()?;
    ensure(body.get(key).is_some(), || {
        format!("{}: expected property {:?} in {}", what(response, "body"), key, body)
    })
}

/// Body contains `expected` as a structural subset
pub fn validate_body_matches(response: &ApiResponse, expected: &Value) -> CheckResult<()> {
    let body = response.value()?;
    ensure(json_matches(&body, expected), || {
        format!("{}: expected to match {}, got {}", what(response, "body"), expected, body)
    })
}

pub fn validate_array_length(response: &ApiResponse, expected: usize) -> CheckResult<()> {
    let body = response.value()?;
    let items = body.as_array().ok_or_else(|| {
        let field = what(response, "body");
        CheckError::assertion(format!("{}: expected an array, got {}", field, body))
    })?;
    ensure_eq(&what(response, "array length"), items.len(), expected)
}
