use crate::ids::{ImdbId, ShowId};

/// External catalog hit as returned by the imdb lookup
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogMatch {
    pub imdbid: ImdbId,
    pub title: String,
}

/// Internal show hit as returned by the title query
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShowMatch {
    pub id: ShowId,
    pub title: String,
}

/// Uniform (identifier, title) row of a rendered result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
}

impl From<CatalogMatch> for SearchResult {
    fn from(value: CatalogMatch) -> Self {
        SearchResult {
            id: value.imdbid.to_string(),
            title: value.title,
        }
    }
}

impl From<ShowMatch> for SearchResult {
    fn from(value: ShowMatch) -> Self {
        SearchResult {
            id: value.id.into_inner(),
            title: value.title,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_rows() {
        let movies: Vec<CatalogMatch> = serde_json::from_str(
            r#"[{"imdbid": "0133093", "title": "The Matrix (1999)"}]"#,
        )
        .unwrap();
        let row: SearchResult = movies[0].clone().into();
        assert_eq!(row.id, "0133093");
        assert_eq!(row.title, "The Matrix (1999)");

        let shows: Vec<ShowMatch> =
            serde_json::from_str(r#"[{"id": 4, "title": "Seinfeld"}]"#)
                .unwrap();
        assert_eq!(shows[0].id.as_str(), "4");
    }
}
