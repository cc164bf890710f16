use jiff::{Timestamp, fmt::rfc2822::DateTimeParser};
use reqwest::{StatusCode, header::HeaderMap};
use serde_json::Value;

use crate::error::{ApiError, ErrorKind};

/// Headers that may carry the rate-limit reset time, in lookup order
pub const RATE_LIMIT_RESET_HEADERS: [&str; 2] = ["x-ratelimit-reset", "reset-at"];

static HTTP_DATE: DateTimeParser = DateTimeParser::new();

/// Classify a non-2xx response
///
/// The kind is decided by `status` alone. The body is parsed on a
/// best-effort basis for an error code, a message and validation details;
/// when it is not JSON the raw text becomes the message. This never fails.
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &str) -> ApiError {
    let parsed = parse_error_body(body);

    let kind = match status.as_u16() {
        401 | 403 => ErrorKind::Authentication,
        404 => ErrorKind::NotFound,
        400 => ErrorKind::Validation {
            details: parsed.validation_errors,
        },
        429 => ErrorKind::RateLimited {
            reset_at: reset_time(headers),
        },
        500 | 502 | 503 | 504 => ErrorKind::ServerError,
        _ => ErrorKind::Generic,
    };

    let message = parsed.message.unwrap_or_else(|| fallback_message(status, body));

    ApiError::new(kind, status.as_u16(), parsed.code, message)
}

/// Parse a rate-limit reset header value
///
/// Accepts RFC 3339 (`2026-10-18T12:00:00Z`), RFC 2822 / HTTP-date
/// (`Sun, 18 Oct 2026 12:00:00 GMT`) and integer Unix seconds.
pub fn parse_reset_time(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Some(timestamp);
    }

    if let Ok(timestamp) = HTTP_DATE.parse_timestamp(raw) {
        return Some(timestamp);
    }

    raw.parse::<i64>().ok().and_then(|seconds| Timestamp::from_second(seconds).ok())
}

#[derive(Debug, Default)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    validation_errors: Option<Value>,
}

/// Pull `{status, message, validationErrors}` out of an error body
///
/// The fields may sit at the top level or under `detail`.
fn parse_error_body(body: &str) -> ErrorBody {
    let Ok(Value::Object(root)) = serde_json::from_str::<Value>(body) else {
        return ErrorBody::default();
    };

    let detail = root.get("detail");
    let field = |name: &str| {
        root.get(name)
            .or_else(|| detail.and_then(Value::as_object).and_then(|d| d.get(name)))
            .filter(|v| !v.is_null())
    };

    let message = field("message")
        .and_then(Value::as_str)
        .or_else(|| detail.and_then(Value::as_str))
        .map(str::to_owned);

    ErrorBody {
        code: field("status").and_then(Value::as_str).map(str::to_owned),
        message,
        validation_errors: field("validationErrors").cloned(),
    }
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        format!(
            "request failed with status {} ({})",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    } else {
        body.to_owned()
    }
}

fn reset_time(headers: &HeaderMap) -> Option<Timestamp> {
    RATE_LIMIT_RESET_HEADERS
        .iter()
        .flat_map(|name| headers.get_all(*name))
        .find_map(|value| value.to_str().ok().and_then(parse_reset_time))
}
