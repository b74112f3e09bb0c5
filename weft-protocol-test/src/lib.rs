/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Validators for asserting that serialized requests match expectations in
//! service-client tests, with readable failures.

use assert_json_diff::assert_json_eq_no_panic;
use http::{Request, Uri};
use pretty_assertions::Comparison;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// A stringified value whose `Debug` output is itself, so pretty-printed
/// comparisons stay readable.
#[derive(Eq, PartialEq)]
struct PrettyString(String);

impl fmt::Debug for PrettyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ProtocolTestFailure {
    #[error("missing query param: expected `{expected}`, found {found:?}")]
    MissingQueryParam {
        expected: String,
        found: Vec<String>,
    },
    #[error("forbidden query param present: `{expected}`")]
    ForbiddenQueryParam { expected: String },
    #[error("missing header: expected `{expected}`")]
    MissingHeader { expected: String },
    #[error("invalid header value for key `{key}`: expected `{expected_value}`, found `{found_value}`")]
    InvalidHeader {
        key: String,
        expected_value: String,
        found_value: String,
    },
    #[error("body did not match. {comparison}\nhint: {hint}")]
    BodyDidNotMatch {
        comparison: String,
        hint: String,
    },
    #[error("a field named {field} was invalid: {details}")]
    InvalidBodyFormat { field: String, details: String },
}

fn extract_params(uri: &Uri) -> HashSet<&str> {
    uri.query().unwrap_or_default().split('&').collect()
}

/// Check that the query string contains every `key=value` pair in
/// `expected_params`.
pub fn validate_query_string<B>(
    request: &Request<B>,
    expected_params: &[&str],
) -> Result<(), ProtocolTestFailure> {
    let actual_params = extract_params(request.uri());
    for param in expected_params {
        if !actual_params.contains(param) {
            return Err(ProtocolTestFailure::MissingQueryParam {
                expected: param.to_string(),
                found: actual_params.iter().map(|s| s.to_string()).collect(),
            });
        }
    }
    Ok(())
}

/// Check that the query string contains every key in `required_keys`,
/// regardless of value.
pub fn require_query_params<B>(
    request: &Request<B>,
    required_keys: &[&str],
) -> Result<(), ProtocolTestFailure> {
    let actual_keys: HashSet<&str> = extract_params(request.uri())
        .iter()
        .map(|param| param.split('=').next().unwrap_or_default())
        .collect();
    for key in required_keys {
        if !actual_keys.contains(key) {
            return Err(ProtocolTestFailure::MissingQueryParam {
                expected: key.to_string(),
                found: actual_keys.iter().map(|s| s.to_string()).collect(),
            });
        }
    }
    Ok(())
}

/// Check that none of `forbid_keys` appear in the query string.
pub fn forbid_query_params<B>(
    request: &Request<B>,
    forbid_keys: &[&str],
) -> Result<(), ProtocolTestFailure> {
    let actual_keys: HashSet<&str> = extract_params(request.uri())
        .iter()
        .map(|param| param.split('=').next().unwrap_or_default())
        .collect();
    for key in forbid_keys {
        if actual_keys.contains(key) {
            return Err(ProtocolTestFailure::ForbiddenQueryParam {
                expected: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Check each `(key, value)` pair against the request headers. Multi-valued
/// headers are compared comma-joined.
pub fn validate_headers<B>(
    request: &Request<B>,
    expected_headers: &[(&str, &str)],
) -> Result<(), ProtocolTestFailure> {
    for (key, expected_value) in expected_headers {
        let actual_values = request.headers().get_all(*key);
        let mut iter = actual_values.iter().peekable();
        if iter.peek().is_none() {
            return Err(ProtocolTestFailure::MissingHeader {
                expected: key.to_string(),
            });
        }
        let actual_value: Vec<&str> = actual_values
            .iter()
            .map(|v| v.to_str().unwrap_or("<binary>"))
            .collect();
        let actual_value = actual_value.join(", ");
        if &actual_value != expected_value {
            return Err(ProtocolTestFailure::InvalidHeader {
                key: key.to_string(),
                expected_value: expected_value.to_string(),
                found_value: actual_value,
            });
        }
    }
    Ok(())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MediaType {
    /// JSON media types are validated structurally, ignoring key order.
    Json,
    /// Other media types are compared byte for byte.
    Other(String),
}

impl<'a> From<&'a str> for MediaType {
    fn from(media_type: &'a str) -> Self {
        match media_type {
            mt if mt.contains("json") => MediaType::Json,
            other => MediaType::Other(other.to_string()),
        }
    }
}

/// Check that the actual body matches the expected one under the comparison
/// rules of the given media type.
pub fn validate_body(
    actual_body: impl AsRef<[u8]>,
    expected_body: &str,
    media_type: MediaType,
) -> Result<(), ProtocolTestFailure> {
    let actual_body = std::str::from_utf8(actual_body.as_ref()).map_err(|_| {
        ProtocolTestFailure::InvalidBodyFormat {
            field: "body".to_string(),
            details: "the body was not valid UTF-8".to_string(),
        }
    })?;
    match media_type {
        MediaType::Json => validate_json_body(actual_body, expected_body),
        MediaType::Other(media_type) => {
            if actual_body != expected_body {
                Err(ProtocolTestFailure::BodyDidNotMatch {
                    comparison: pretty_comparison(actual_body, expected_body),
                    hint: format!("media type: {}", media_type),
                })
            } else {
                Ok(())
            }
        }
    }
}

fn validate_json_body(actual: &str, expected: &str) -> Result<(), ProtocolTestFailure> {
    let actual_json: serde_json::Value =
        serde_json::from_str(actual).map_err(|e| ProtocolTestFailure::InvalidBodyFormat {
            field: "body".to_string(),
            details: format!("the actual body was not valid JSON: {}", e),
        })?;
    let expected_json: serde_json::Value =
        serde_json::from_str(expected).map_err(|e| ProtocolTestFailure::InvalidBodyFormat {
            field: "body".to_string(),
            details: format!("the expected body was not valid JSON: {}", e),
        })?;
    match assert_json_eq_no_panic(&actual_json, &expected_json) {
        Ok(()) => Ok(()),
        Err(message) => Err(ProtocolTestFailure::BodyDidNotMatch {
            comparison: message,
            hint: "json values must match structurally; key order is ignored".to_string(),
        }),
    }
}

fn pretty_comparison(actual: &str, expected: &str) -> String {
    format!(
        "{}",
        Comparison::new(
            &PrettyString(actual.to_string()),
            &PrettyString(expected.to_string())
        )
    )
}

/// Unwrap a validator result, panicking with its message on failure. Use in
/// tests for failures that point at what differed.
pub fn assert_ok(inp: Result<(), ProtocolTestFailure>) {
    match inp {
        Ok(_) => (),
        Err(e) => panic!("{}", e),
    }
}
