//! Core data model definitions shared across Kinoknecht crates.
#![allow(missing_docs)]

pub mod category;
pub mod endpoint;
pub mod error;
pub mod ids;
pub mod routes;
pub mod search;

// Intentionally curated re-exports for downstream consumers.
pub use category::Category;
pub use endpoint::{Endpoint, HttpMethod};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{EpisodeId, ImdbId, MovieId, ShowId, VideoFileId};
pub use routes::{browse_path, details_path};
pub use search::{CatalogMatch, SearchResult, ShowMatch};
