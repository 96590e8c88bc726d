//! # Kinoknecht client
//!
//! Client side of the kinoknecht catalog: classify loose video files into
//! movies, shows and episodes through the server's creation endpoints.
//!
//! - [`api`]: the [`CatalogApi`] seam and its reqwest implementation
//! - [`tracker`]: counts in-flight requests and signals when they drain
//! - [`controller`]: selection handling and the creation workflows
//! - [`view`]: where results, reloads and navigation are delivered
//! - [`config`]: layered client configuration
#![allow(missing_docs)]

pub mod api;
pub mod config;
pub mod controller;
pub mod effects;
pub mod error;
pub mod selection;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod tracker;
pub mod view;

pub use api::{ApiClient, CatalogApi, CreateRequest};
pub use config::{
    ClientConfig, ConfigError, ConfigLoad, ConfigLoader, ConfigOverrides,
};
pub use controller::{CatalogController, FailedLink, LinkReport, LinkedEpisode};
pub use effects::DrainEffects;
pub use error::{ClientError, Result};
pub use selection::{CheckboxGroup, Selection};
pub use tracker::{Drain, DrainHandler, InFlight, OperationScope, Outcome, RequestTracker};
pub use view::{CatalogView, RecordingView, SearchKind, ViewEvent};
