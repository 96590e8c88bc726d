use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use super::{
    ClientConfig, ConfigError, ConfigMetadata, DEFAULT_USER_AGENT,
    normalize_base_url,
    sources::{EnvConfig, FileConfig},
};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["kinoknecht.toml", "config/kinoknecht.toml"];

#[derive(Debug, Default, Clone)]
struct LoaderOptions {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

/// Values supplied on the command line; these win over every other layer.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: ClientConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, gather the process environment and compose the config.
    pub fn load(
        &self,
        overrides: &ConfigOverrides,
    ) -> Result<ConfigLoad, ConfigError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut load = self.load_with_env(EnvConfig::gather()?, overrides)?;
        load.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Compose the config from an already gathered environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        overrides: &ConfigOverrides,
    ) -> Result<ConfigLoad, ConfigError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let config = compose_config(file_config.unwrap_or_default(), env, overrides)?;

        tracing::debug!(
            base_url = %config.base_url,
            timeout_secs = config.request_timeout.as_secs(),
            config_path = ?config_path,
            "client configuration loaded"
        );

        Ok(ConfigLoad {
            config,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded: false,
            },
        })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigError> {
        // An explicitly named file must exist; the default locations are
        // only consulted when nothing was named.
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingConfig { path });
                }
                path
            }
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    overrides: &ConfigOverrides,
) -> Result<ClientConfig, ConfigError> {
    let defaults = ClientConfig::default();

    let base_url = match overrides
        .base_url
        .clone()
        .or(env.base_url)
        .or(file.server.base_url)
    {
        Some(raw) => normalize_base_url(&raw)?,
        None => defaults.base_url,
    };

    let request_timeout = match overrides
        .timeout_secs
        .or(env.timeout_secs)
        .or(file.server.timeout_secs)
    {
        Some(0) => return Err(ConfigError::ZeroTimeout),
        Some(secs) => Duration::from_secs(secs),
        None => defaults.request_timeout,
    };

    let user_agent = env
        .user_agent
        .or(file.server.user_agent)
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    Ok(ClientConfig {
        base_url,
        request_timeout,
        user_agent,
    })
}
