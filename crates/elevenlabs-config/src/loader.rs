use std::path::Path;

use secrecy::ExposeSecret;
use url::Url;

use crate::{ClientConfig, ConfigError};

impl ClientConfig {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let expanded = crate::env::expand_env(&raw)?;
        let config: Self = toml::from_str(&expanded)?;

        config.validate()?;

        tracing::debug!(path = %path.display(), base_url = %config.base_url, "loaded client configuration");

        Ok(config)
    }

    /// Check that the configuration can be used to issue requests
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank, the base URL is blank or
    /// malformed, or the timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        self.endpoint()?;

        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    /// Parsed base URL, normalised to end with `/`
    ///
    /// The trailing slash makes relative request paths resolve beneath the
    /// base path (`…/v1/` + `voices` → `…/v1/voices`).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is blank, does not parse, or is not
    /// an http(s) URL
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let raw = self.base_url.trim();

        if raw.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }

        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason,
        };

        let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_owned()));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}
