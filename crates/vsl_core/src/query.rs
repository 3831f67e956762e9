//! Search-query lifecycle.
//!
//! `QueryController` owns the live [`QueryState`] of one search view. Every
//! call to [`QueryController::set_term`] bumps a generation counter; a lookup
//! carries the generation it was issued under and its outcome is applied only
//! while that generation is still the live one. Outcomes are therefore applied
//! in issuance order, whatever order the network resolves them in.

use vsl_logging::{vsl_debug, vsl_warn};

use crate::SearchResultItem;

/// Monotonic request tag issued by a [`QueryController`].
pub type Generation = u64;

/// Fixed user-facing text for any failed lookup. The cause is only logged.
pub const SEARCH_FAILED_MESSAGE: &str = "There was an error while searching. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Renderable snapshot of the search view.
///
/// `results` is non-empty only when `status` is `Succeeded`, and
/// `error_message` is set only when `status` is `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryState {
    pub term: String,
    pub status: QueryStatus,
    pub results: Vec<SearchResultItem>,
    pub error_message: Option<String>,
}

impl QueryState {
    fn loading(term: String) -> Self {
        Self {
            term,
            status: QueryStatus::Loading,
            results: Vec::new(),
            error_message: None,
        }
    }
}

/// A lookup the caller must perform and later report back through
/// [`QueryController::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: Generation,
    pub term: String,
}

/// Outcome of a lookup as reported by the IO layer. `Err` holds the
/// diagnostic detail, which never reaches the rendered state.
pub type SearchResult = Result<Vec<SearchResultItem>, String>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryController {
    state: QueryState,
    generation: Generation,
    in_flight: Option<Generation>,
    disposed: bool,
}

impl QueryController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh controller whose first request is tagged after `generation`,
    /// so answers addressed to a predecessor can never match it.
    pub fn starting_after(generation: Generation) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// True while `generation` is the outstanding request whose outcome
    /// would still be applied.
    pub fn is_current(&self, generation: Generation) -> bool {
        !self.disposed && self.in_flight == Some(generation)
    }

    /// Applies a raw input value. Returns the lookup to issue, if any.
    ///
    /// Every call invalidates whatever request was outstanding, including a
    /// call repeating the current term.
    pub fn set_term(&mut self, raw: &str) -> Option<SearchRequest> {
        if self.disposed {
            vsl_debug!("set_term ignored on disposed controller");
            return None;
        }

        let term = normalize_term(raw);
        self.generation += 1;
        self.in_flight = None;

        if term.is_empty() {
            self.state = QueryState::default();
            return None;
        }

        self.state = QueryState::loading(term.to_owned());
        self.in_flight = Some(self.generation);
        Some(SearchRequest {
            generation: self.generation,
            term: term.to_owned(),
        })
    }

    /// Applies the outcome of a lookup. Returns `false` when the outcome was
    /// discarded because the request had been superseded or the controller
    /// disposed.
    pub fn resolve(&mut self, generation: Generation, result: SearchResult) -> bool {
        if !self.is_current(generation) {
            vsl_debug!(
                "Discarding superseded search result generation={} live={}",
                generation,
                self.generation
            );
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(results) => {
                self.state.status = QueryStatus::Succeeded;
                self.state.results = results;
                self.state.error_message = None;
            }
            Err(detail) => {
                vsl_warn!("Search for {:?} failed: {}", self.state.term, detail);
                self.state.status = QueryStatus::Failed;
                self.state.results.clear();
                self.state.error_message = Some(SEARCH_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// Tears the controller down. Outstanding requests are invalidated and no
    /// later call changes the state.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.generation += 1;
        self.in_flight = None;
    }
}

pub fn normalize_term(raw: &str) -> &str {
    raw.trim()
}
