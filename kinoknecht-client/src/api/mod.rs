//! Catalog API seam
//!
//! `CatalogApi` is the boundary between the controller and the server. The
//! reqwest backed [`ApiClient`] talks to a real kinoknecht instance; tests
//! substitute `StubCatalogApi` from the `testing` module (feature `test-utils`).

mod client;
mod request;

pub use client::ApiClient;
pub use request::{
    CreateRequest, EPISODE_IDS_KEY, VFILES_KEY, add_to_show_fields,
};

use async_trait::async_trait;
use kinoknecht_model::{Category, CatalogMatch, EpisodeId, ShowId, ShowMatch, VideoFileId};

use crate::error::Result;

#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Title guess derived from a video file's name
    async fn get_clean_name(&self, vfid: &VideoFileId) -> Result<String>;

    /// Search the external movie catalog
    async fn query_imdb(&self, searchstr: &str) -> Result<Vec<CatalogMatch>>;

    /// Search internal objects of one category by title
    async fn query(
        &self,
        category: Category,
        searchstr: &str,
    ) -> Result<Vec<ShowMatch>>;

    /// Create an object; returns the new object's id as sent by the server
    async fn create(&self, request: &CreateRequest) -> Result<String>;

    /// Link episodes to a show; returns the server's response body
    async fn add_to_show(
        &self,
        episodes: &[EpisodeId],
        show: &ShowId,
    ) -> Result<String>;
}
