//! Server endpoints consumed by the catalog client
//!
//! All paths are relative to the script root the server was mounted under.

use std::fmt::{Display, Formatter};

/// HTTP verb used for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Create a movie, show or episode
pub const CREATE: &str = "/_create";
/// Link episodes to a show
pub const ADD_TO_SHOW: &str = "/_add_to_show";
/// Normalize a video file name into a title guess
pub const GET_CLEAN_NAME: &str = "/_get_clean_name";
/// Search the external movie catalog
pub const QUERY_IMDB: &str = "/_query_imdb";
/// Search internal objects by title
pub const QUERY: &str = "/_query";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Create,
    AddToShow,
    GetCleanName,
    QueryImdb,
    Query,
}

impl Endpoint {
    pub const fn path(&self) -> &'static str {
        match self {
            Endpoint::Create => CREATE,
            Endpoint::AddToShow => ADD_TO_SHOW,
            Endpoint::GetCleanName => GET_CLEAN_NAME,
            Endpoint::QueryImdb => QUERY_IMDB,
            Endpoint::Query => QUERY,
        }
    }

    pub const fn method(&self) -> HttpMethod {
        match self {
            Endpoint::Create | Endpoint::AddToShow => HttpMethod::Post,
            Endpoint::GetCleanName | Endpoint::QueryImdb | Endpoint::Query => {
                HttpMethod::Get
            }
        }
    }

    /// Whether a completed call changes server state.
    pub const fn is_mutation(&self) -> bool {
        matches!(self.method(), HttpMethod::Post)
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
