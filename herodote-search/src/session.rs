//! Live search session state, published read-only to the UI.

use crate::error::SearchError;
use crate::types::{CommitItem, ParsedQuery};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchStatus {
    /// No query has been evaluated yet, or search is unavailable.
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    pub status: SearchStatus,
    /// Text as typed
    pub raw_query: String,
    pub query: ParsedQuery,
    pub results: Vec<CommitItem>,
    /// Zero-based page a load-more would request
    pub next_page: u32,
    pub page_count: u32,
    /// Bumped on every query change; responses from older generations are dropped
    pub generation: u64,
    /// Last failure, kept until the next query change
    pub error: Option<SearchError>,
    /// A page after the first is being fetched
    pub loading_more: bool,
}

impl SearchSession {
    pub fn has_more(&self) -> bool {
        self.status == SearchStatus::Success && self.next_page < self.page_count
    }
}
