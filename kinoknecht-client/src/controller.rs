//! Catalog controller
//!
//! Owns the checkbox model, the selection and the request tracker, and runs
//! the creation workflows against a [`CatalogApi`]. Every server call goes
//! through the tracker, so the page side effects in
//! [`DrainEffects`](crate::effects::DrainEffects) fire once per burst of
//! activity, however the calls interleave.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use kinoknecht_model::{
    Category, Endpoint, EpisodeId, ImdbId, MovieId, SearchResult, ShowId,
    VideoFileId,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::api::{CatalogApi, CreateRequest};
use crate::effects::DrainEffects;
use crate::error::{ClientError, Result};
use crate::selection::{CheckboxGroup, Selection};
use crate::tracker::RequestTracker;
use crate::view::{CatalogView, SearchKind};

/// Episode created for a video file and linked to the show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedEpisode {
    pub file: VideoFileId,
    pub episode: EpisodeId,
}

/// Video file whose episode chain stopped at `error`
#[derive(Debug)]
pub struct FailedLink {
    pub file: VideoFileId,
    pub error: ClientError,
}

/// Per-file outcome of an episode fan-out
#[derive(Debug)]
pub struct LinkReport {
    pub show_id: ShowId,
    pub linked: Vec<LinkedEpisode>,
    pub failed: Vec<FailedLink>,
}

impl LinkReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    checkboxes: CheckboxGroup,
    selection: Selection,
}

pub struct CatalogController<A, V> {
    api: Arc<A>,
    view: Arc<V>,
    tracker: RequestTracker,
    state: Mutex<ControllerState>,
}

impl<A, V> std::fmt::Debug for CatalogController<A, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogController")
            .field("tracker", &self.tracker)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl<A, V> CatalogController<A, V>
where
    A: CatalogApi,
    V: CatalogView + 'static,
{
    pub fn new(api: Arc<A>, view: Arc<V>) -> Self {
        let tracker = RequestTracker::new();
        tracker.set_drain_handler(Arc::new(DrainEffects::new(view.clone())));
        Self {
            api,
            view,
            tracker,
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// Replace the listed video files; all rows start unchecked.
    pub fn set_files<I>(&self, files: I)
    where
        I: IntoIterator<Item = VideoFileId>,
    {
        self.state.lock().checkboxes = CheckboxGroup::new(files);
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    pub fn view(&self) -> &Arc<V> {
        &self.view
    }

    pub fn selection(&self) -> Vec<VideoFileId> {
        self.state.lock().selection.snapshot()
    }

    pub fn checked(&self) -> Vec<VideoFileId> {
        self.state.lock().checkboxes.checked()
    }

    pub fn set_checked(&self, file: &VideoFileId, checked: bool) -> bool {
        self.state.lock().checkboxes.set_checked(file, checked)
    }

    pub fn toggle_select_all(&self, checked: bool) {
        self.state.lock().checkboxes.toggle_select_all(checked);
    }

    /// Selection := ticked rows in listing order. Returns the new selection.
    pub fn capture_selection_from_checked(&self) -> Vec<VideoFileId> {
        let mut state = self.state.lock();
        let checked = state.checkboxes.checked();
        state.selection.replace(checked);
        debug!("Selected {} video files", state.selection.len());
        state.selection.snapshot()
    }

    pub fn capture_single_selection(&self, file: VideoFileId) {
        debug!("Selected video file {}", file);
        self.state.lock().selection.select_single(file);
    }

    /// Ask the server for a title guess and put it into the title input.
    pub async fn fetch_suggested_title(
        &self,
        file: &VideoFileId,
    ) -> Result<String> {
        let title = self
            .query(Endpoint::GetCleanName, self.api.get_clean_name(file))
            .await
            .inspect_err(|err| {
                warn!("No title suggestion for {}: {}", file, err);
            })?;
        self.view.set_title_query(&title);
        Ok(title)
    }

    /// Run a title search and replace the matching result list.
    pub async fn search_external_catalog(
        &self,
        searchstr: &str,
        kind: SearchKind,
    ) -> Result<Vec<SearchResult>> {
        let results: Vec<SearchResult> = match kind {
            SearchKind::Movies => self
                .query(Endpoint::QueryImdb, self.api.query_imdb(searchstr))
                .await?
                .into_iter()
                .map(SearchResult::from)
                .collect(),
            SearchKind::Shows => self
                .query(
                    Endpoint::Query,
                    self.api.query(Category::Show, searchstr),
                )
                .await?
                .into_iter()
                .map(SearchResult::from)
                .collect(),
        };
        debug!(
            "Search for {:?} returned {} {}",
            searchstr,
            results.len(),
            kind.as_str()
        );
        self.view.render_results(kind, &results);
        Ok(results)
    }

    /// Create a movie from the selected files and an external catalog entry.
    pub async fn create_from_catalog_match(
        &self,
        imdbid: ImdbId,
    ) -> Result<MovieId> {
        let files = self.snapshot_selection()?;
        let request = CreateRequest::movie(files, imdbid)?;
        let body = self
            .mutation(Endpoint::Create, self.api.create(&request))
            .await?;
        let movie = MovieId::new(body)?;
        info!("Created movie {}", movie);
        Ok(movie)
    }

    /// Create a show, then an episode per selected file, each linked to the
    /// new show.
    ///
    /// The selection is read once, when the call starts.
    pub async fn create_show_then_link_episodes(
        &self,
        title: &str,
    ) -> Result<LinkReport> {
        let files = self.snapshot_selection()?;
        let request = CreateRequest::show(title)?;
        let _scope = self.tracker.scope();

        let body = self
            .mutation(Endpoint::Create, self.api.create(&request))
            .await?;
        let show = ShowId::new(body)?;
        info!("Created show {} ({})", show, title.trim());

        Ok(self.link_files(files, show).await)
    }

    /// Create an episode per selected file and link them to `show`.
    pub async fn link_selection_to_show(
        &self,
        show: ShowId,
    ) -> Result<LinkReport> {
        let files = self.snapshot_selection()?;
        let _scope = self.tracker.scope();
        Ok(self.link_files(files, show).await)
    }

    fn snapshot_selection(&self) -> Result<Vec<VideoFileId>> {
        let files = self.state.lock().selection.snapshot();
        if files.is_empty() {
            return Err(ClientError::EmptySelection);
        }
        Ok(files)
    }

    async fn link_files(
        &self,
        files: Vec<VideoFileId>,
        show: ShowId,
    ) -> LinkReport {
        let chains = files.into_iter().map(|file| {
            let show = &show;
            async move {
                let result = self.link_file(&file, show).await;
                (file, result)
            }
        });

        let mut report = LinkReport {
            show_id: show.clone(),
            linked: Vec::new(),
            failed: Vec::new(),
        };
        for (file, result) in join_all(chains).await {
            match result {
                Ok(episode) => report.linked.push(LinkedEpisode { file, episode }),
                Err(error) => {
                    warn!("Linking {} to show {} failed: {}", file, show, error);
                    report.failed.push(FailedLink { file, error });
                }
            }
        }

        info!(
            "Linked {}/{} episodes to show {}",
            report.linked.len(),
            report.linked.len() + report.failed.len(),
            show
        );
        report
    }

    async fn link_file(
        &self,
        file: &VideoFileId,
        show: &ShowId,
    ) -> Result<EpisodeId> {
        let request = CreateRequest::episode(file.clone());
        let body = self
            .mutation(Endpoint::Create, self.api.create(&request))
            .await?;
        let episode = EpisodeId::new(body)?;

        // The link reply is not a reliable show id, so the drain carries ours.
        self.tracked(
            Endpoint::AddToShow,
            self.api.add_to_show(std::slice::from_ref(&episode), show),
            |_| Some(show.to_string()),
        )
        .await?;
        Ok(episode)
    }

    async fn query<T>(
        &self,
        endpoint: Endpoint,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        self.tracked(endpoint, call, |_| None).await
    }

    /// Creation calls hand the new object's id to the drain.
    async fn mutation(
        &self,
        endpoint: Endpoint,
        call: impl Future<Output = Result<String>>,
    ) -> Result<String> {
        self.tracked(endpoint, call, |id: &String| Some(id.clone())).await
    }

    async fn tracked<T>(
        &self,
        endpoint: Endpoint,
        call: impl Future<Output = Result<T>>,
        drain_body: impl FnOnce(&T) -> Option<String>,
    ) -> Result<T> {
        let request = self.tracker.begin(endpoint);
        match call.await {
            Ok(value) => {
                request.succeed(drain_body(&value));
                Ok(value)
            }
            Err(err) => {
                request.fail(&err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubCatalogApi;
    use crate::view::{RecordingView, ViewEvent};

    fn ids(raw: &[&str]) -> Vec<VideoFileId> {
        raw.iter().map(|r| VideoFileId::new(*r).unwrap()).collect()
    }

    fn controller(
        api: StubCatalogApi,
    ) -> CatalogController<StubCatalogApi, RecordingView> {
        CatalogController::new(Arc::new(api), Arc::new(RecordingView::new()))
    }

    #[test]
    fn capture_replaces_previous_selection() {
        let controller = controller(StubCatalogApi::new());
        controller.set_files(ids(&["a", "b", "c"]));

        controller.toggle_select_all(true);
        assert_eq!(controller.capture_selection_from_checked(), ids(&["a", "b", "c"]));

        controller.toggle_select_all(false);
        controller.set_checked(&VideoFileId::new("b").unwrap(), true);
        controller.capture_selection_from_checked();
        assert_eq!(controller.selection(), ids(&["b"]));

        controller.capture_single_selection(VideoFileId::new("c").unwrap());
        assert_eq!(controller.selection(), ids(&["c"]));
    }

    #[tokio::test]
    async fn empty_selection_sends_nothing() {
        let api = StubCatalogApi::new();
        let controller = controller(api.clone());

        let err = controller
            .create_show_then_link_episodes("Show")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::EmptySelection));
        let err = controller
            .create_from_catalog_match("1".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::EmptySelection));

        assert!(api.calls().is_empty());
        assert_eq!(controller.tracker().drain_count(), 0);
        assert!(controller.view().events().is_empty());
    }

    #[tokio::test]
    async fn failed_suggestion_leaves_title_untouched() {
        let api = StubCatalogApi::new();
        let controller = controller(api);

        let result = controller
            .fetch_suggested_title(&VideoFileId::new("missing").unwrap())
            .await;
        assert!(result.is_err());
        assert_eq!(controller.view().title_query(), None);
        assert!(matches!(
            controller.view().events().as_slice(),
            [ViewEvent::Error(_)]
        ));
        assert!(controller.tracker().is_idle());
    }
}
