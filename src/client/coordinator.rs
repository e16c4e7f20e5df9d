//! Debounced search coordination.
//!
//! Keystrokes reset a quiet-period timer; only the last input of a burst
//! issues a listing call. Every call gets the next sequence number, and a
//! response is applied only if no later call has been issued since. Calls
//! already in flight are never aborted; stale results are dropped on arrival.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::PostSource;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::gallery::ListOutcome;
use crate::repository::Post;

/// Configuration for the coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Quiet period after the last input before a search is issued
    pub debounce: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

impl From<&SearchConfig> for CoordinatorConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
        }
    }
}

/// What the UI should currently display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    /// Text currently in the search box
    pub query: String,
    /// Posts from the most recently applied result
    pub posts: Vec<Post>,
    /// Sequence number of the applied result (0 before any result)
    pub sequence: u64,
    /// The applied result is the placeholder demo gallery
    pub degraded: bool,
    /// The latest issued call has not completed yet
    pub loading: bool,
    /// Failure of the latest call; the previous posts stay visible
    pub error: Option<String>,
}

struct CoordinatorState {
    query: String,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every input; a timer may only fire for its own generation
    generation: u64,
    issued: u64,
}

struct Inner {
    source: Arc<dyn PostSource>,
    debounce: Duration,
    state: Mutex<CoordinatorState>,
    view: watch::Sender<SearchView>,
}

/// Client-side search coordinator
pub struct SearchCoordinator {
    inner: Arc<Inner>,
}

impl SearchCoordinator {
    pub fn new(source: Arc<dyn PostSource>, config: CoordinatorConfig) -> Self {
        let (view, _) = watch::channel(SearchView::default());
        Self {
            inner: Arc::new(Inner {
                source,
                debounce: config.debounce,
                state: Mutex::new(CoordinatorState {
                    query: String::new(),
                    timer: None,
                    generation: 0,
                    issued: 0,
                }),
                view,
            }),
        }
    }

    /// Issue the initial, non-debounced listing with empty search text
    pub fn load(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let sequence = {
            let mut state = inner.state.lock();
            inner.begin_call(&mut state)
        };
        tokio::spawn(async move { inner.run(sequence, String::new()).await })
    }

    /// Record new search text and restart the quiet-period timer
    pub fn input(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.inner.state.lock();

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.query = text.clone();

        let generation = state.generation;
        let inner = self.inner.clone();
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            inner.fire(generation).await;
        }));

        self.inner.view.send_modify(|view| view.query = text);
    }

    /// Snapshot of the visible state
    pub fn view(&self) -> SearchView {
        self.inner.view.borrow().clone()
    }

    /// Receive every change of the visible state
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.inner.view.subscribe()
    }

    /// Number of listing calls issued so far
    pub fn issued(&self) -> u64 {
        self.inner.state.lock().issued
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.state.lock().timer.take() {
            timer.abort();
        }
    }
}

impl Inner {
    fn begin_call(&self, state: &mut CoordinatorState) -> u64 {
        state.issued += 1;
        self.view.send_modify(|view| view.loading = true);
        state.issued
    }

    /// Timer expiry. A superseded timer that woke before being aborted does nothing.
    async fn fire(&self, generation: u64) {
        let (sequence, query) = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return;
            }
            // Detach so a later keystroke cannot abort the call now in flight.
            state.timer = None;
            let query = state.query.clone();
            (self.begin_call(&mut state), query)
        };

        self.run(sequence, query).await;
    }

    async fn run(&self, sequence: u64, query: String) {
        debug!(sequence = sequence, query = %query, "Issuing search");
        let result = self.source.list_posts(&query).await;
        self.apply(sequence, result);
    }

    fn apply(&self, sequence: u64, result: Result<ListOutcome>) {
        let state = self.state.lock();
        if sequence != state.issued {
            debug!(sequence = sequence, latest = state.issued, "Discarding stale search result");
            return;
        }

        self.view.send_modify(|view| {
            match result {
                Ok(outcome) => {
                    view.degraded = outcome.is_degraded();
                    view.posts = outcome.into_posts();
                    view.error = None;
                }
                Err(e) => view.error = Some(e.to_string()),
            }
            view.sequence = sequence;
            view.loading = false;
        });
    }
}
