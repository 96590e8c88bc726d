use kinoknecht_client::{CatalogView, SearchKind};
use kinoknecht_model::{Category, SearchResult, browse_path};
use url::Url;

/// Prints view updates to the terminal.
///
/// Page navigation has no terminal equivalent, so reloads and navigation
/// targets are printed as absolute URLs the user can open.
#[derive(Debug)]
pub struct ConsoleView {
    base_url: Url,
}

impl ConsoleView {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

impl CatalogView for ConsoleView {
    fn set_title_query(&self, title: &str) {
        println!("{title}");
    }

    fn render_results(&self, kind: SearchKind, results: &[SearchResult]) {
        if results.is_empty() {
            println!("No {} found", kind.as_str());
            return;
        }
        let width = results.iter().map(|r| r.id.len()).max().unwrap_or(0);
        for result in results {
            println!("{:>width$}  {}", result.id, result.title);
        }
    }

    fn reload(&self) {
        // The file listing is where unclassified video files remain.
        let listing = browse_path(Category::File, 1);
        println!("Done, see {}", self.absolute(&listing));
    }

    fn navigate(&self, path: &str) {
        println!("Done, see {}", self.absolute(path));
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }
}
