//! Assertion helpers shared by validators and actions
//!
//! Each helper returns `Ok(())` or a [`CheckError::Assertion`] describing the
//! expected and actual values.

use serde_json::Value;
use std::fmt::Debug;

use crate::error::{CheckError, CheckResult};

pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> CheckResult<()> {
    if condition {
        Ok(())
    } else {
        Err(CheckError::Assertion(message()))
    }
}

pub fn ensure_eq<T>(what: &str, actual: T, expected: T) -> CheckResult<()>
where
    T: PartialEq + Debug,
{
    ensure(actual == expected, || {
        format!("{}: expected {:?}, got {:?}", what, expected, actual)
    })
}

pub fn ensure_contains(what: &str, haystack: &str, needle: &str) -> CheckResult<()> {
    ensure(haystack.contains(needle), || {
        format!("{}: expected {:?} to contain {:?}", what, haystack, needle)
    })
}

pub fn ensure_at_least<T>(what: &str, actual: T, minimum: T) -> CheckResult<()>
where
    T: PartialOrd + Debug,
{
    ensure(actual >= minimum, || {
        format!("{}: expected at least {:?}, got {:?}", what, minimum, actual)
    })
}

pub fn ensure_at_most<T>(what: &str, actual: T, maximum: T) -> CheckResult<()>
where
    T: PartialOrd + Debug,
{
    ensure(actual <= maximum, || {
        format!("{}: expected at most {:?}, got {:?}", what, maximum, actual)
    })
}

pub fn ensure_one_of<T>(what: &str, actual: T, allowed: &[T]) -> CheckResult<()>
where
    T: PartialEq + Debug,
{
    ensure(allowed.contains(&actual), || {
        format!("{}: expected one of {:?}, got {:?}", what, allowed, actual)
    })
}

/// Whether `actual` contains everything in `expected`.
///
/// Objects match when every key of `expected` is present in `actual` with a
/// matching value (extra keys in `actual` are ignored). Arrays must have the
/// same length and match element-wise. Everything else compares by equality.
pub fn json_matches(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected
            .iter()
            .all(|(key, value)| actual.get(key).is_some_and(|found| json_matches(found, value))),
        (Value::Array(actual), Value::Array(expected)) => {
            actual.len() == expected.len()
                && actual.iter().zip(expected).all(|(a, e)| json_matches(a, e))
        }
        _ => actual == expected,
    }
}
