use kinoknecht_model::{Category, EpisodeId, ImdbId, ShowId, VideoFileId};

use crate::error::{ClientError, Result};

/// Array parameters are sent as repeated bracketed keys (`vfiles[]=1&vfiles[]=2`).
pub const VFILES_KEY: &str = "vfiles[]";
pub const EPISODE_IDS_KEY: &str = "episodeids[]";

/// Body of a `/_create` call.
///
/// Constructors enforce the same argument rules the server applies: a movie
/// needs at least one video file and a catalog id, a show needs a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRequest {
    Movie {
        vfiles: Vec<VideoFileId>,
        imdbid: ImdbId,
    },
    Show {
        title: String,
    },
    Episode {
        vfile: VideoFileId,
    },
}

impl CreateRequest {
    pub fn movie(vfiles: Vec<VideoFileId>, imdbid: ImdbId) -> Result<Self> {
        if vfiles.is_empty() {
            return Err(ClientError::EmptySelection);
        }
        Ok(CreateRequest::Movie { vfiles, imdbid })
    }

    pub fn show(title: &str) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ClientError::InvalidRequest(
                "a show needs a title".to_string(),
            ));
        }
        Ok(CreateRequest::Show {
            title: title.to_string(),
        })
    }

    pub fn episode(vfile: VideoFileId) -> Self {
        CreateRequest::Episode { vfile }
    }

    pub fn category(&self) -> Category {
        match self {
            CreateRequest::Movie { .. } => Category::Movie,
            CreateRequest::Show { .. } => Category::Show,
            CreateRequest::Episode { .. } => Category::Episode,
        }
    }

    /// Form fields in the order they are sent.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("type", self.category().as_str().to_string())];
        match self {
            CreateRequest::Movie { vfiles, imdbid } => {
                fields.extend(
                    vfiles.iter().map(|id| (VFILES_KEY, id.to_string())),
                );
                fields.push(("imdbid", imdbid.to_string()));
            }
            CreateRequest::Show { title } => {
                fields.push(("title", title.clone()));
            }
            CreateRequest::Episode { vfile } => {
                fields.push((VFILES_KEY, vfile.to_string()));
            }
        }
        fields
    }
}

/// Form fields of an `/_add_to_show` call.
pub fn add_to_show_fields(
    episodes: &[EpisodeId],
    show: &ShowId,
) -> Vec<(&'static str, String)> {
    let mut fields: Vec<_> = episodes
        .iter()
        .map(|id| (EPISODE_IDS_KEY, id.to_string()))
        .collect();
    fields.push(("showid", show.to_string()));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vfile(raw: &str) -> VideoFileId {
        VideoFileId::new(raw).unwrap()
    }

    #[test]
    fn movie_fields_repeat_vfiles() {
        let request = CreateRequest::movie(
            vec![vfile("3"), vfile("4")],
            "tt0133093".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(
            request.form_fields(),
            vec![
                ("type", "movie".to_string()),
                ("vfiles[]", "3".to_string()),
                ("vfiles[]", "4".to_string()),
                ("imdbid", "0133093".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_movie_without_files_and_blank_show() {
        assert!(matches!(
            CreateRequest::movie(vec![], "1".parse().unwrap()),
            Err(ClientError::EmptySelection)
        ));
        assert!(matches!(
            CreateRequest::show("   "),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn episode_and_link_fields() {
        let episode = CreateRequest::episode(vfile("9"));
        assert_eq!(
            episode.form_fields(),
            vec![("type", "episode".to_string()), ("vfiles[]", "9".to_string())]
        );

        let fields = add_to_show_fields(
            &[EpisodeId::new("21").unwrap()],
            &ShowId::new("5").unwrap(),
        );
        assert_eq!(
            fields,
            vec![("episodeids[]", "21".to_string()), ("showid", "5".to_string())]
        );
    }
}
