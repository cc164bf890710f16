#![allow(clippy::must_use_candidate)]

//! Configuration for the `ElevenLabs` API client
//!
//! A [`ClientConfig`] carries the API base address, the credential and the
//! request timeout. It can be built in code, read from the environment, or
//! loaded from a TOML file, and is validated before any transport is built.

mod env;
mod error;
mod loader;

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

pub use env::{API_KEY_ENV, BASE_URL_ENV, TIMEOUT_ENV};
pub use error::ConfigError;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 100;

/// Connection settings for the `ElevenLabs` API
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// API key sent in the `xi-api-key` header
    pub api_key: SecretString,
    /// Base URL all request paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ClientConfig {
    /// Create a configuration for the production API with the default timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: default_base_url(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Point the client at a different base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request timeout
    #[must_use]
    pub const fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Request timeout as a [`Duration`]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

const fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}
