//! In-memory [`CatalogApi`] for tests and dry runs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use kinoknecht_model::{
    Category, CatalogMatch, Endpoint, EpisodeId, ShowId, ShowMatch, VideoFileId,
};
use parking_lot::Mutex;
use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::api::{CatalogApi, CreateRequest};
use crate::error::{ClientError, Result};

/// One call received by [`StubCatalogApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    GetCleanName(VideoFileId),
    QueryImdb(String),
    Query(Category, String),
    Create(CreateRequest),
    AddToShow {
        episodes: Vec<EpisodeId>,
        show: ShowId,
    },
}

/// Pauses show creation until the test lets it continue
#[derive(Debug, Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Resolves once a show creation is parked at the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Debug, Default)]
struct StubState {
    calls: Vec<ApiCall>,
    clean_names: HashMap<VideoFileId, String>,
    imdb_matches: Vec<CatalogMatch>,
    show_matches: Vec<ShowMatch>,
    failing: HashSet<Endpoint>,
    failing_files: HashSet<VideoFileId>,
    next_id: u64,
    link_reply: Option<String>,
    show_gate: Option<Arc<Gate>>,
}

/// Scriptable stand-in for the kinoknecht server.
///
/// Created objects get increasing numeric ids starting at 100. A show link
/// answers with the show id unless [`StubCatalogApi::with_link_reply`] says
/// otherwise.
#[derive(Debug, Clone, Default)]
pub struct StubCatalogApi {
    state: Arc<Mutex<StubState>>,
}

impl StubCatalogApi {
    pub fn new() -> Self {
        let stub = Self::default();
        stub.state.lock().next_id = 100;
        stub
    }

    pub fn with_clean_name(self, vfid: &VideoFileId, title: &str) -> Self {
        self.state
            .lock()
            .clean_names
            .insert(vfid.clone(), title.to_string());
        self
    }

    pub fn with_imdb_matches(self, matches: Vec<CatalogMatch>) -> Self {
        self.state.lock().imdb_matches = matches;
        self
    }

    pub fn with_show_matches(self, matches: Vec<ShowMatch>) -> Self {
        self.state.lock().show_matches = matches;
        self
    }

    /// Body every show link answers with.
    pub fn with_link_reply(self, reply: &str) -> Self {
        self.state.lock().link_reply = Some(reply.to_string());
        self
    }

    /// Every call to `endpoint` answers with a 500.
    pub fn failing(self, endpoint: Endpoint) -> Self {
        self.state.lock().failing.insert(endpoint);
        self
    }

    /// Episode creation for `vfid` answers with a 500.
    pub fn failing_episode_for(self, vfid: &VideoFileId) -> Self {
        self.state.lock().failing_files.insert(vfid.clone());
        self
    }

    /// Park every show creation at the returned gate.
    pub fn gate_show_creation(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.state.lock().show_gate = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().calls.clone()
    }

    pub fn creates(&self) -> Vec<CreateRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::Create(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn links(&self) -> Vec<(Vec<EpisodeId>, ShowId)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::AddToShow { episodes, show } => Some((episodes, show)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) -> Result<()> {
        let mut state = self.state.lock();
        let endpoint = match &call {
            ApiCall::GetCleanName(_) => Endpoint::GetCleanName,
            ApiCall::QueryImdb(_) => Endpoint::QueryImdb,
            ApiCall::Query(..) => Endpoint::Query,
            ApiCall::Create(_) => Endpoint::Create,
            ApiCall::AddToShow { .. } => Endpoint::AddToShow,
        };
        let file_fails = matches!(
            &call,
            ApiCall::Create(CreateRequest::Episode { vfile })
                if state.failing_files.contains(vfile)
        );
        state.calls.push(call);

        if file_fails || state.failing.contains(&endpoint) {
            return Err(ClientError::Status {
                endpoint,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "stubbed failure".to_string(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> String {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        id.to_string()
    }
}

#[async_trait]
impl CatalogApi for StubCatalogApi {
    async fn get_clean_name(&self, vfid: &VideoFileId) -> Result<String> {
        self.record(ApiCall::GetCleanName(vfid.clone()))?;
        self.state
            .lock()
            .clean_names
            .get(vfid)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                endpoint: Endpoint::GetCleanName,
                status: StatusCode::NOT_FOUND,
                body: format!("no video file {vfid}"),
            })
    }

    async fn query_imdb(&self, searchstr: &str) -> Result<Vec<CatalogMatch>> {
        self.record(ApiCall::QueryImdb(searchstr.to_string()))?;
        Ok(self.state.lock().imdb_matches.clone())
    }

    async fn query(
        &self,
        category: Category,
        searchstr: &str,
    ) -> Result<Vec<ShowMatch>> {
        self.record(ApiCall::Query(category, searchstr.to_string()))?;
        let needle = searchstr.to_lowercase();
        Ok(self
            .state
            .lock()
            .show_matches
            .iter()
            .filter(|show| show.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create(&self, request: &CreateRequest) -> Result<String> {
        if matches!(request, CreateRequest::Show { .. }) {
            let gate = self.state.lock().show_gate.clone();
            if let Some(gate) = gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
        }
        self.record(ApiCall::Create(request.clone()))?;
        // Let concurrent chains interleave like real network calls.
        tokio::task::yield_now().await;
        Ok(self.next_id())
    }

    async fn add_to_show(
        &self,
        episodes: &[EpisodeId],
        show: &ShowId,
    ) -> Result<String> {
        self.record(ApiCall::AddToShow {
            episodes: episodes.to_vec(),
            show: show.clone(),
        })?;
        tokio::task::yield_now().await;
        let reply = self.state.lock().link_reply.clone();
        Ok(reply.unwrap_or_else(|| show.to_string()))
    }
}
