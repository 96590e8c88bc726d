//! In-flight request accounting
//!
//! Every server call is registered with a [`RequestTracker`] for its whole
//! lifetime. When the last outstanding request (and the last open
//! [`OperationScope`]) finishes, the tracker emits exactly one [`Drain`] to
//! its [`DrainHandler`], carrying the aggregate outcome of everything that
//! completed since the previous drain.
//!
//! Requests are represented by an owned [`InFlight`] handle. Finishing
//! consumes it, and dropping it unfinished records a failure, so the count
//! can never be left above zero by a request that errored or was cancelled.

use std::fmt::Display;
use std::sync::Arc;

use kinoknecht_model::Endpoint;
use parking_lot::{Mutex, MutexGuard, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Result of one tracked request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Mutating endpoints keep their response body, queries keep nothing
    Succeeded { body: Option<String> },
    Failed { error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}

/// Emitted once each time the tracker goes from busy to idle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drain {
    /// Position of this drain, starting at 1; handlers see them in order
    pub seq: u64,
    /// Endpoint of the request that completed last
    pub last_endpoint: Endpoint,
    pub last_outcome: Outcome,
    pub succeeded: usize,
    pub failures: Vec<(Endpoint, String)>,
}

impl Drain {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn completed(&self) -> usize {
        self.succeeded + self.failures.len()
    }

    /// Response body of the last request, if it succeeded with one.
    pub fn last_body(&self) -> Option<&str> {
        match &self.last_outcome {
            Outcome::Succeeded { body } => body.as_deref(),
            Outcome::Failed { .. } => None,
        }
    }
}

pub trait DrainHandler: Send + Sync {
    fn on_drain(&self, drain: &Drain);
}

#[derive(Debug, Default)]
struct TrackerState {
    in_flight: usize,
    open_scopes: usize,
    succeeded: usize,
    failures: Vec<(Endpoint, String)>,
    last: Option<(Endpoint, Outcome)>,
    drains: u64,
}

impl TrackerState {
    fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.open_scopes == 0
    }

    /// Close the current window if nothing is pending and something completed.
    fn take_drain(&mut self) -> Option<Drain> {
        if !self.is_idle() {
            return None;
        }
        let (last_endpoint, last_outcome) = self.last.take()?;
        self.drains += 1;
        Some(Drain {
            seq: self.drains,
            last_endpoint,
            last_outcome,
            succeeded: std::mem::take(&mut self.succeeded),
            failures: std::mem::take(&mut self.failures),
        })
    }
}

struct TrackerInner {
    state: Mutex<TrackerState>,
    // Held from the end of a window until its handler returns.
    dispatch: Mutex<()>,
    pending_tx: watch::Sender<usize>,
    handler: RwLock<Option<Arc<dyn DrainHandler>>>,
}

/// Shared counter of outstanding requests with a debounced drain signal
#[derive(Clone)]
pub struct RequestTracker {
    inner: Arc<TrackerInner>,
}

impl std::fmt::Debug for RequestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("RequestTracker")
            .field("in_flight", &state.in_flight)
            .field("open_scopes", &state.open_scopes)
            .field("drains", &state.drains)
            .finish()
    }
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestTracker {
    pub fn new() -> Self {
        let (pending_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(TrackerInner {
                state: Mutex::new(TrackerState::default()),
                dispatch: Mutex::new(()),
                pending_tx,
                handler: RwLock::new(None),
            }),
        }
    }

    /// Install the drain callback.
    ///
    /// The handler runs with no tracker state locked, but drains are delivered
    /// one at a time, so it must not finish tracked requests itself.
    pub fn set_drain_handler(&self, handler: Arc<dyn DrainHandler>) {
        *self.inner.handler.write() = Some(handler);
    }

    /// Register a request that is about to be sent.
    pub fn begin(&self, endpoint: Endpoint) -> InFlight {
        {
            let mut state = self.inner.state.lock();
            state.in_flight += 1;
            debug!("Request no {} started: {}", state.in_flight, endpoint);
            self.publish_pending(&state);
        }

        InFlight {
            tracker: self.clone(),
            endpoint,
            finished: false,
        }
    }

    /// Hold off the drain signal until the returned scope is dropped.
    ///
    /// Multi-step workflows open a scope so the gap between one request
    /// finishing and its follow-up starting is not mistaken for idleness.
    pub fn scope(&self) -> OperationScope {
        {
            let mut state = self.inner.state.lock();
            state.open_scopes += 1;
            self.publish_pending(&state);
        }
        OperationScope {
            tracker: self.clone(),
        }
    }

    /// Number of requests currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.inner.state.lock().in_flight
    }

    /// Number of drain events emitted so far.
    pub fn drain_count(&self) -> u64 {
        self.inner.state.lock().drains
    }

    pub fn is_idle(&self) -> bool {
        self.inner.state.lock().is_idle()
    }

    /// Resolves once no request or scope is outstanding.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.pending_tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|pending| *pending == 0).await;
    }

    // Published under the state lock so watchers never observe a stale count.
    fn publish_pending(&self, state: &TrackerState) {
        self.inner
            .pending_tx
            .send_replace(state.in_flight + state.open_scopes);
    }

    fn complete(&self, endpoint: Endpoint, outcome: Outcome) {
        let mut state = self.inner.state.lock();
        debug_assert!(state.in_flight > 0, "request finished twice");
        state.in_flight = state.in_flight.saturating_sub(1);
        match &outcome {
            Outcome::Succeeded { .. } => {
                debug!("Request to {} succeeded", endpoint);
                state.succeeded += 1;
            }
            Outcome::Failed { error } => {
                warn!("Request to {} failed: {}", endpoint, error);
                state.failures.push((endpoint, error.clone()));
            }
        }
        state.last = Some((endpoint, outcome));
        self.close_window(state);
    }

    fn close_scope(&self) {
        let mut state = self.inner.state.lock();
        state.open_scopes = state.open_scopes.saturating_sub(1);
        self.close_window(state);
    }

    fn close_window(&self, mut state: MutexGuard<'_, TrackerState>) {
        self.publish_pending(&state);
        let Some(drain) = state.take_drain() else {
            return;
        };
        // Taken before the state lock is released so a later window cannot
        // overtake this one on its way to the handler.
        let _dispatching = self.inner.dispatch.lock();
        drop(state);

        info!(
            "All requests finished ({} succeeded, {} failed), last was {}",
            drain.succeeded,
            drain.failures.len(),
            drain.last_endpoint
        );
        let handler = self.inner.handler.read().clone();
        if let Some(handler) = handler {
            handler.on_drain(&drain);
        }
    }
}

/// Handle for one outstanding request
#[must_use = "dropping an InFlight records the request as failed"]
pub struct InFlight {
    tracker: RequestTracker,
    endpoint: Endpoint,
    finished: bool,
}

impl std::fmt::Debug for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight")
            .field("endpoint", &self.endpoint)
            .field("finished", &self.finished)
            .finish()
    }
}

impl InFlight {
    pub fn finish(mut self, outcome: Outcome) {
        self.finished = true;
        self.tracker.complete(self.endpoint, outcome);
    }

    pub fn succeed(self, body: Option<String>) {
        self.finish(Outcome::Succeeded { body });
    }

    pub fn fail(self, error: impl Display) {
        self.finish(Outcome::Failed {
            error: error.to_string(),
        });
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            self.tracker.complete(
                self.endpoint,
                Outcome::Failed {
                    error: "request abandoned before completion".to_string(),
                },
            );
        }
    }
}

/// Keeps the tracker from draining while a workflow is still running
#[must_use = "the drain is only held while the scope is alive"]
pub struct OperationScope {
    tracker: RequestTracker,
}

impl std::fmt::Debug for OperationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationScope").finish_non_exhaustive()
    }
}

impl Drop for OperationScope {
    fn drop(&mut self) {
        self.tracker.close_scope();
    }
}
