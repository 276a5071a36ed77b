//! Search request lifecycle and dropdown state.
//!
//! The controller is synchronous and owns all widget state. It never
//! performs I/O itself: [`SearchController::dispatch`] hands back a
//! [`SearchRequest`] for the caller to run, and the caller reports the
//! outcome through [`SearchController::complete`]. Only the completion of
//! the live, uncancelled request may change state.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::SearchError;
use crate::models::User;
use crate::pointer::{Bounds, Point};
use crate::view::ViewState;

pub type RequestId = u64;

/// Identity and cancellation handle of the in-flight request.
#[derive(Debug)]
pub struct RequestToken {
    id: RequestId,
    cancel: CancellationToken,
}

impl RequestToken {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A search the caller should execute, aborting when `cancel` fires.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub id: RequestId,
    pub query: String,
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dropdown {
    #[default]
    Closed,
    Open,
}

/// What a completion did to the controller.
#[derive(Debug)]
pub enum Completion {
    /// Stale or cancelled; state untouched.
    Discarded,
    Results(usize),
    NoResults,
    Failed(SearchError),
}

#[derive(Debug)]
pub struct SearchController {
    query: String,
    results: Vec<User>,
    loading: bool,
    no_results: bool,
    dropdown: Dropdown,
    live: Option<RequestToken>,
    next_id: RequestId,
    root: CancellationToken,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

/// Accessors.
impl SearchController {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            loading: false,
            no_results: false,
            dropdown: Dropdown::Closed,
            live: None,
            next_id: 1,
            root: CancellationToken::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[User] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn no_results(&self) -> bool {
        self.no_results
    }

    pub fn dropdown(&self) -> Dropdown {
        self.dropdown
    }

    pub fn is_open(&self) -> bool {
        self.dropdown == Dropdown::Open
    }

    pub fn live_request(&self) -> Option<&RequestToken> {
        self.live.as_ref()
    }

    pub fn view(&self) -> ViewState {
        ViewState {
            query: self.query.clone(),
            results: self.results.clone(),
            loading: self.loading,
            is_open: self.is_open(),
            no_results: self.no_results,
        }
    }
}

/// Request lifecycle.
impl SearchController {
    /// Records the raw input text. Searching waits for [`Self::dispatch`].
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    /// Starts a search for `text`, superseding any request still in flight.
    ///
    /// Whitespace is trimmed before the emptiness check; an empty query
    /// clears the results and returns `None`.
    pub fn dispatch(&mut self, text: &str) -> Option<SearchRequest> {
        self.cancel_live();

        let query = text.trim();
        if query.is_empty() {
            self.results.clear();
            self.no_results = false;
            self.loading = false;
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        let cancel = self.root.child_token();
        self.live = Some(RequestToken {
            id,
            cancel: cancel.clone(),
        });
        self.loading = true;
        debug!(id, query, "dispatching search");

        Some(SearchRequest {
            id,
            query: query.to_string(),
            cancel,
        })
    }

    /// Applies the outcome of request `id`.
    pub fn complete(
        &mut self,
        id: RequestId,
        outcome: Result<Vec<User>, SearchError>,
    ) -> Completion {
        let is_live = self
            .live
            .as_ref()
            .is_some_and(|token| token.id == id && !token.is_cancelled());
        if !is_live {
            debug!(id, "discarding stale search response");
            return Completion::Discarded;
        }

        self.live = None;
        self.loading = false;

        match outcome {
            Ok(users) if users.is_empty() => {
                self.results.clear();
                self.no_results = true;
                Completion::NoResults
            }
            Ok(users) => {
                let count = users.len();
                self.results = users;
                self.no_results = false;
                Completion::Results(count)
            }
            // Our own cancellations were filtered above; this is the backend
            // giving up by itself. Results stay, but the slot is released so
            // `loading` cannot stick.
            Err(SearchError::Cancelled) => Completion::Discarded,
            Err(err @ SearchError::Malformed(_)) => {
                error!(id, error = %err, "search response has unexpected shape");
                self.results.clear();
                Completion::Failed(err)
            }
            Err(err) => {
                error!(id, error = %err, "search request failed");
                Completion::Failed(err)
            }
        }
    }

    /// The clear affordance: empties the input and drops everything in flight.
    pub fn clear(&mut self) {
        self.cancel_live();
        self.query.clear();
        self.results.clear();
        self.no_results = false;
        self.loading = false;
    }

    /// Cancels every request this controller has issued.
    pub fn teardown(&mut self) {
        self.root.cancel();
        self.live = None;
        self.loading = false;
    }

    fn cancel_live(&mut self) {
        if let Some(token) = self.live.take() {
            debug!(id = token.id, "cancelling superseded search");
            token.cancel.cancel();
            self.loading = false;
        }
    }
}

/// Dropdown visibility.
impl SearchController {
    pub fn focus(&mut self) {
        self.dropdown = Dropdown::Open;
    }

    /// Closes the dropdown when the press lands outside `bounds`.
    pub fn pointer_down(&mut self, position: Point, bounds: &Bounds) {
        if self.dropdown == Dropdown::Open && !bounds.contains(position) {
            self.dropdown = Dropdown::Closed;
        }
    }
}
