use std::time::Duration;

use elevenlabs_config::ConfigError;
use jiff::Timestamp;

/// Client-specific result type
pub type Result<T> = std::result::Result<T, ElevenLabsError>;

/// Every outcome of a client call that is not a success
#[derive(Debug, thiserror::Error)]
pub enum ElevenLabsError {
    /// Configuration was rejected before any request was issued
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The API answered with a non-2xx status, or could not be reached
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The configured request timeout expired
    #[error("request timed out after {}s", after.as_secs())]
    Timeout {
        /// Timeout that was exceeded
        after: Duration,
    },

    /// The caller cancelled the operation
    ///
    /// Not a failure of the service; no [`ApiError`] is produced.
    #[error("request was cancelled")]
    Cancelled,

    /// A successful response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Caller input was rejected before any request was issued
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ElevenLabsError {
    /// Whether this is the caller-initiated cancellation outcome
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The classified API error, if this is one
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            _ => None,
        }
    }

    /// Kind of the classified API error, if this is one
    pub const fn kind(&self) -> Option<&ErrorKind> {
        match self {
            Self::Api(error) => Some(&error.kind),
            _ => None,
        }
    }

    /// Map a `reqwest` failure to the outcome callers branch on
    pub(crate) fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            Self::Timeout { after: timeout }
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Api(ApiError::connection(error))
        }
    }
}

/// Classification of a failed API call
///
/// Chosen from the HTTP status alone; body contents never change the kind.
#[derive(Debug, Clone, PartialEq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// 401 or 403: the API key was missing, invalid or lacks permission
    Authentication,
    /// 404: the voice, model or route does not exist
    NotFound,
    /// 400: the request was rejected as invalid
    Validation {
        /// `validationErrors` payload from the error body, if any
        details: Option<serde_json::Value>,
    },
    /// 429: too many requests
    RateLimited {
        /// When the limit resets, if the API said so
        reset_at: Option<Timestamp>,
    },
    /// 500, 502, 503, 504, or the service could not be reached at all
    ServerError,
    /// Any other non-2xx status
    Generic,
}

/// A classified failure from the `ElevenLabs` API
#[derive(Debug, thiserror::Error)]
#[error("{kind} error{}: {message}", status_suffix(.status))]
pub struct ApiError {
    /// What went wrong
    pub kind: ErrorKind,
    /// HTTP status; `None` when the service could not be reached
    pub status: Option<u16>,
    /// Provider error code (the `status` field of the error body)
    pub error_code: Option<String>,
    /// Provider message, or the raw response text when the body was not JSON
    pub message: String,
    #[source]
    source: Option<reqwest::Error>,
}

impl ApiError {
    /// Create an error for a response the API actually returned
    pub fn new(kind: ErrorKind, status: u16, error_code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: Some(status),
            error_code,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error for a request that never got a response
    pub(crate) fn connection(error: reqwest::Error) -> Self {
        Self {
            kind: ErrorKind::ServerError,
            status: None,
            error_code: None,
            message: format!("could not reach the ElevenLabs API: {error}"),
            source: Some(error),
        }
    }

    /// The service could not be reached (DNS, connect, TLS, reset)
    ///
    /// Distinguishes network faults from a 5xx returned by the service.
    pub const fn is_connection_failure(&self) -> bool {
        self.status.is_none()
    }

    /// Whether repeating the same request later may succeed
    ///
    /// A hint for caller-owned retry policy; nothing here retries.
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::RateLimited { .. } | ErrorKind::ServerError)
    }

    /// Rate-limit reset time, for [`ErrorKind::RateLimited`]
    pub const fn reset_at(&self) -> Option<Timestamp> {
        match &self.kind {
            ErrorKind::RateLimited { reset_at } => *reset_at,
            _ => None,
        }
    }

    /// Validation payload, for [`ErrorKind::Validation`]
    pub const fn validation_details(&self) -> Option<&serde_json::Value> {
        match &self.kind {
            ErrorKind::Validation { details } => details.as_ref(),
            _ => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|status| format!(" ({status})")).unwrap_or_default()
}
