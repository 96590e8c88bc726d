//! Client configuration
//!
//! Values are layered from lowest to highest precedence: built-in defaults,
//! an optional `kinoknecht.toml`, the process environment (optionally seeded
//! from a `.env` file) and finally explicit overrides from the command line.

mod loader;
mod sources;

pub use loader::{ConfigLoad, ConfigLoader, ConfigOverrides};
pub use sources::{EnvConfig, FileClientConfig, FileConfig};

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Address of a locally running kinoknecht server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:6600";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str =
    concat!("kinoknecht-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Script root every endpoint path is appended to
    pub base_url: Url,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL)
                .expect("default base URL is valid"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid base URL '{raw}'")]
    InvalidBaseUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base URL '{raw}' must use http or https")]
    UnsupportedScheme { raw: String },
    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

/// Normalize a user supplied base URL.
///
/// Adds `http://` when the scheme is missing and trims trailing slashes so
/// endpoint paths can be appended verbatim. A URL without a host is rejected.
pub fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest))
            if scheme.eq_ignore_ascii_case("http")
                || scheme.eq_ignore_ascii_case("https") =>
        {
            (scheme.to_ascii_lowercase(), rest)
        }
        Some(_) => {
            return Err(ConfigError::UnsupportedScheme {
                raw: raw.to_string(),
            });
        }
        None => ("http".to_string(), trimmed),
    };

    let invalid = |source| ConfigError::InvalidBaseUrl {
        raw: raw.to_string(),
        source,
    };

    let rest = rest.trim_end_matches('/');
    if rest.is_empty() {
        return Err(invalid(url::ParseError::EmptyHost));
    }

    let with_scheme = format!("{scheme}://{rest}");
    if with_scheme != raw {
        tracing::debug!(
            "Normalized base URL from '{}' to '{}'",
            raw,
            with_scheme
        );
    }

    let url = Url::parse(&with_scheme).map_err(invalid)?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid(url::ParseError::EmptyHost));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_scheme_and_trims_slash() {
        let url = normalize_base_url("localhost:6600/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:6600/");
        assert_eq!(url.port(), Some(6600));

        let with_root = normalize_base_url("https://media.lan/kino/").unwrap();
        assert_eq!(with_root.path(), "/kino");
    }

    #[test]
    fn rejects_foreign_schemes() {
        assert!(matches!(
            normalize_base_url("ftp://media.lan"),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            normalize_base_url("gopher://media.lan/"),
            Err(ConfigError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn rejects_urls_without_host() {
        for raw in ["http://", "https://", "https:///", "  http:// ", "/", ""] {
            assert!(
                matches!(
                    normalize_base_url(raw),
                    Err(ConfigError::InvalidBaseUrl { .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn scheme_is_matched_case_insensitively() {
        let url = normalize_base_url("HTTPS://media.lan/kino").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("media.lan"));
    }
}
