use std::sync::Arc;

use kinoknecht_model::{Category, Endpoint, details_path};
use tracing::{debug, warn};

use crate::tracker::{Drain, DrainHandler};
use crate::view::CatalogView;

/// Page side effects applied when all outstanding requests have finished.
///
/// A window with any failure only reports the errors. Otherwise the endpoint
/// that completed last decides: a creation reloads the page, a show link
/// opens the show's detail page and queries change nothing.
pub struct DrainEffects<V> {
    view: Arc<V>,
}

impl<V> std::fmt::Debug for DrainEffects<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrainEffects").finish_non_exhaustive()
    }
}

impl<V: CatalogView> DrainEffects<V> {
    pub fn new(view: Arc<V>) -> Self {
        Self { view }
    }
}

impl<V: CatalogView> DrainHandler for DrainEffects<V> {
    fn on_drain(&self, drain: &Drain) {
        if !drain.is_clean() {
            let details: Vec<String> = drain
                .failures
                .iter()
                .map(|(endpoint, error)| format!("{endpoint}: {error}"))
                .collect();
            self.view.show_error(&format!(
                "{} of {} requests failed ({})",
                drain.failures.len(),
                drain.completed(),
                details.join("; ")
            ));
            return;
        }

        if !drain.last_endpoint.is_mutation() {
            debug!("Queries finished, nothing to refresh");
            return;
        }

        match (drain.last_endpoint, drain.last_body()) {
            (Endpoint::AddToShow, Some(show_id)) => {
                self.view.navigate(&details_path(Category::Show, show_id))
            }
            (Endpoint::AddToShow, None) => {
                warn!("Show link finished without a show id")
            }
            _ => self.view.reload(),
        }
    }
}
