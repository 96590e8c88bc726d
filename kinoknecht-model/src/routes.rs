//! Page routes served by the kinoknecht web app

use crate::category::Category;

/// Browse page base path
pub const BROWSE: &str = "/browse";
/// Detail page base path
pub const DETAILS: &str = "/details";

/// `/details/<category>/<id>`
pub fn details_path(category: Category, id: impl AsRef<str>) -> String {
    format!("{DETAILS}/{}/{}", category.as_str(), id.as_ref())
}

/// `/browse/<category>/<page>`; pages are 1-based and 0 is clamped to 1.
pub fn browse_path(category: Category, page: u32) -> String {
    format!("{BROWSE}/{}/{}", category.as_str(), page.max(1))
}
