#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Transport layer for the `ElevenLabs` API
//!
//! [`HttpTransport`] issues authenticated requests relative to a configured
//! base URL and turns every non-2xx response into a classified
//! [`ApiError`]. Successful responses are handed back as [`ApiResponse`],
//! which can be decoded as JSON or consumed incrementally as an
//! [`AudioStream`].

mod classify;
mod error;
mod request;
mod response;
mod transport;

pub use classify::{RATE_LIMIT_RESET_HEADERS, classify, parse_reset_time};
pub use elevenlabs_config::{ClientConfig, ConfigError};
pub use error::{ApiError, ElevenLabsError, ErrorKind, Result};
pub use request::{AUDIO_CONTENT_TYPE, AUDIO_FIELD_NAME, AUDIO_FILE_NAME, ApiRequest, AudioUpload, RequestBody};
pub use reqwest::Method;
pub use response::{ApiResponse, AudioStream};
pub use tokio_util::sync::CancellationToken;
pub use transport::HttpTransport;
