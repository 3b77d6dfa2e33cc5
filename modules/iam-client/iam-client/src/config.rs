//! Configuration for the IAM client.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "https://cloud.iamcore.io";

/// Prefix of the environment variables read by [`IamClientConfig::load`].
pub const ENV_PREFIX: &str = "IAMCORE_";

const ENV_KEYS: [&str; 5] = [
    "server_url",
    "api_key",
    "enforcement",
    "request_timeout",
    "resource_types_page_size",
];

/// Whether authentication and authorization are enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementMode {
    #[default]
    Enabled,
    /// Checks are skipped and every skip is logged under the `iam_client::audit` target.
    Disabled,
}

impl EnforcementMode {
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// IAM client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IamClientConfig {
    /// Base URL of the IAM server.
    pub server_url: String,

    /// Service API key, used for service-to-service calls.
    pub api_key: Option<SecretString>,

    pub enforcement: EnforcementMode,

    /// Timeout of a single IAM server call, in humantime format (`"10s"`, `"500ms"`).
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,

    /// Page size used when listing resource types.
    pub resource_types_page_size: u32,
}

impl Default for IamClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            api_key: None,
            enforcement: EnforcementMode::Enabled,
            request_timeout: Duration::from_secs(10),
            resource_types_page_size: 100,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid server_url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },

    #[error("request_timeout must be greater than zero")]
    ZeroTimeout,

    #[error("resource_types_page_size must be greater than zero")]
    ZeroPageSize,
}

impl IamClientConfig {
    /// Load configuration from an optional YAML file, overridden by
    /// `IAMCORE_`-prefixed environment variables, and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, a value cannot be
    /// deserialized, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).only(&ENV_KEYS))
            .extract()
            .map_err(Box::new)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `server_url` is not an absolute http(s) URL,
    /// or the timeout or page size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            reason: reason.to_owned(),
        };

        let url = url::Url::parse(&self.server_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed"));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.resource_types_page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }

    /// Server URL without a trailing slash, ready for path concatenation.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}
