use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ConfigError;

const TIMEOUT_VAR: &str = "KINOKNECHT_TIMEOUT_SECS";

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileClientConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key).filter(|value| !value.trim().is_empty())
        };

        let timeout_secs = match var(TIMEOUT_VAR) {
            Some(raw) => Some(raw.trim().parse().map_err(|_| {
                ConfigError::InvalidEnv {
                    key: TIMEOUT_VAR,
                    value: raw.clone(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            config_path: var("KINOKNECHT_CONFIG").map(PathBuf::from),
            base_url: var("KINOKNECHT_BASE_URL"),
            timeout_secs,
            user_agent: var("KINOKNECHT_USER_AGENT"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn blank_values_are_unset() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("KINOKNECHT_BASE_URL", "  "),
            ("KINOKNECHT_TIMEOUT_SECS", ""),
            ("KINOKNECHT_USER_AGENT", "kinoctl-test"),
        ]);
        let env = EnvConfig::from_lookup(|key| {
            vars.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert!(env.base_url.is_none());
        assert!(env.timeout_secs.is_none());
        assert_eq!(env.user_agent.as_deref(), Some("kinoctl-test"));
    }

    #[test]
    fn malformed_timeout_is_an_error() {
        let err = EnvConfig::from_lookup(|key| {
            (key == "KINOKNECHT_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        match err {
            ConfigError::InvalidEnv { key, value } => {
                assert_eq!(key, "KINOKNECHT_TIMEOUT_SECS");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let env = EnvConfig::from_lookup(|key| {
            (key == "KINOKNECHT_TIMEOUT_SECS").then(|| " 12 ".to_string())
        })
        .unwrap();
        assert_eq!(env.timeout_secs, Some(12));
    }

    #[test]
    fn file_config_parses_server_table() {
        let parsed: FileConfig = toml::from_str(
            r#"
            [server]
            base_url = "http://media.lan:6600"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.server.base_url.as_deref(),
            Some("http://media.lan:6600")
        );
        assert_eq!(parsed.server.timeout_secs, Some(5));
    }
}
