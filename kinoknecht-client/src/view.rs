//! Presentation seam
//!
//! The controller never renders anything itself. It pushes state changes into
//! a [`CatalogView`]; the CLI prints them, tests record them.

use kinoknecht_model::SearchResult;
use parking_lot::Mutex;

/// Which result list a search fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    /// External movie catalog (imdb)
    Movies,
    /// Shows already known to the server
    Shows,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Movies => "movies",
            SearchKind::Shows => "shows",
        }
    }
}

pub trait CatalogView: Send + Sync {
    /// Fill the title search input.
    fn set_title_query(&self, title: &str);

    /// Replace the result list of `kind` with `results`.
    fn render_results(&self, kind: SearchKind, results: &[SearchResult]);

    /// Reload the current page.
    fn reload(&self);

    /// Go to another page of the web app.
    fn navigate(&self, path: &str);

    fn show_error(&self, message: &str);
}

/// A single view mutation, as seen by [`RecordingView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    TitleQuery(String),
    Results {
        kind: SearchKind,
        results: Vec<SearchResult>,
    },
    Reload,
    Navigate(String),
    Error(String),
}

/// View that only records what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().clone()
    }

    /// Current content of the title input, if anything set it.
    pub fn title_query(&self) -> Option<String> {
        self.events.lock().iter().rev().find_map(|event| match event {
            ViewEvent::TitleQuery(title) => Some(title.clone()),
            _ => None,
        })
    }

    /// Current content of one result list.
    pub fn results(&self, kind: SearchKind) -> Option<Vec<SearchResult>> {
        self.events.lock().iter().rev().find_map(|event| match event {
            ViewEvent::Results { kind: k, results } if *k == kind => {
                Some(results.clone())
            }
            _ => None,
        })
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().push(event);
    }
}

impl CatalogView for RecordingView {
    fn set_title_query(&self, title: &str) {
        self.push(ViewEvent::TitleQuery(title.to_string()));
    }

    fn render_results(&self, kind: SearchKind, results: &[SearchResult]) {
        self.push(ViewEvent::Results {
            kind,
            results: results.to_vec(),
        });
    }

    fn reload(&self) {
        self.push(ViewEvent::Reload);
    }

    fn navigate(&self, path: &str) {
        self.push(ViewEvent::Navigate(path.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.push(ViewEvent::Error(message.to_string()));
    }
}
