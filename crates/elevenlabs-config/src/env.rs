use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::{ClientConfig, ConfigError};

/// Variable holding the API key
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Variable overriding the base URL
pub const BASE_URL_ENV: &str = "ELEVENLABS_BASE_URL";

/// Variable overriding the timeout, in whole seconds
pub const TIMEOUT_ENV: &str = "ELEVENLABS_TIMEOUT_SECONDS";

impl ClientConfig {
    /// Build a configuration from `ELEVENLABS_*` environment variables
    ///
    /// `ELEVENLABS_API_KEY` is required; the base URL and timeout fall back
    /// to their defaults when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is unset, the timeout is not an
    /// integer, or the resulting configuration fails validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingEnv(API_KEY_ENV.to_owned()))?;

        let mut config = Self::new(api_key);

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            config.timeout_seconds = raw.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                name: TIMEOUT_ENV.to_owned(),
                reason: format!("{e}"),
            })?;
        }

        config.validate()?;

        Ok(config)
    }
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `{{ env.NAME }}` with an optional `| default("value")`
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([A-Za-z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

/// Substitute `{{ env.VAR }}` placeholders in raw config text
///
/// Comment lines are left untouched so a commented-out secret never has to
/// be present in the environment.
pub(crate) fn expand_env(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut cursor = 0;

        for captures in placeholder().captures_iter(line) {
            let Some(whole) = captures.get(0) else {
                continue;
            };

            output.push_str(&line[cursor..whole.start()]);
            output.push_str(&resolve(&captures)?);
            cursor = whole.end();
        }

        output.push_str(&line[cursor..]);
    }

    Ok(output)
}

fn resolve(captures: &Captures<'_>) -> Result<String, ConfigError> {
    let key = captures.get(1).map_or("", |m| m.as_str());
    let fallback = captures.get(2).map(|m| m.as_str());

    let Some(name) = key.strip_prefix("env.").filter(|name| !name.is_empty() && !name.contains('.')) else {
        return Err(ConfigError::Expansion(format!(
            "only variables scoped with 'env.' are supported: `{key}`"
        )));
    };

    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_owned()),
        (Err(_), None) => Err(ConfigError::Expansion(format!("environment variable not found: `{name}`"))),
    }
}
