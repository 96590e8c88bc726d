use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::error::ModelError;

/// Kinds of catalog objects the server knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    /// A raw video file
    File,
    /// A movie built from one or more video files
    Movie,
    /// A show grouping episodes
    Show,
    /// A single episode backed by one video file
    Episode,
}

impl Category {
    /// Wire name used in query strings and page routes.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::File => "file",
            Category::Movie => "movie",
            Category::Show => "show",
            Category::Episode => "episode",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Category::File),
            "movie" => Ok(Category::Movie),
            "show" => Ok(Category::Show),
            "episode" => Ok(Category::Episode),
            _ => Err(ModelError::UnknownCategory(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        for category in [
            Category::File,
            Category::Movie,
            Category::Show,
            Category::Episode,
        ] {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert_eq!("Show".parse::<Category>(), Ok(Category::Show));
        assert!("person".parse::<Category>().is_err());
    }
}
