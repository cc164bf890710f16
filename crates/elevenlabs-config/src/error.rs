use std::path::PathBuf;

/// Errors raised while building or validating a [`ClientConfig`](crate::ClientConfig)
///
/// These are setup-time failures: retrying the same configuration never helps.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// API key is empty or whitespace
    #[error("API key is required")]
    MissingApiKey,

    /// API key cannot be carried in an HTTP header
    #[error("API key contains characters that are not valid in an HTTP header")]
    InvalidApiKey,

    /// Base URL is empty or whitespace
    #[error("base URL is required")]
    MissingBaseUrl,

    /// Base URL does not parse or is not http(s)
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl {
        /// The rejected value
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Timeout of zero seconds
    #[error("timeout must be greater than 0 seconds")]
    InvalidTimeout,

    /// Required environment variable is unset
    #[error("environment variable not found: `{0}`")]
    MissingEnv(String),

    /// Environment variable is set but unusable
    #[error("environment variable `{name}` is invalid: {reason}")]
    InvalidEnv {
        /// Variable name
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Config file could not be read
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// `{{ env.VAR }}` placeholder expansion failed
    #[error("config variable expansion failed: {0}")]
    Expansion(String),

    /// TOML did not match the configuration schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The HTTP client could not be constructed from this configuration
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
