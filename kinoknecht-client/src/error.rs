use kinoknecht_model::{Endpoint, ModelError};
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error calling {endpoint}")]
    Http {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} failed with status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode {endpoint} response")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} returned an empty response")]
    EmptyResponse { endpoint: Endpoint },

    #[error("no video files selected")]
    EmptySelection,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
