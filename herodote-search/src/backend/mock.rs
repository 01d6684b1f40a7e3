//! Mock backend implementation for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;

use super::SearchBackend;
use crate::error::{Result, SearchError};
use crate::filters::FilterDescriptor;
use crate::types::{CommitItem, SearchPage};

/// One recorded call to [`SearchBackend::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub text: String,
    pub filters: FilterDescriptor,
    pub page: u32,
}

struct Reply {
    result: Result<Option<SearchPage>>,
    delay: Duration,
}

/// Mock backend that replays scripted replies in order.
///
/// Once the script runs out every search answers an empty page. Clones share
/// the same script and call log.
///
/// # Examples
///
/// ```
/// use herodote_search::backend::mock::{sample_commit, MockBackend};
/// use std::time::Duration;
///
/// let backend = MockBackend::new()
///     .with_page(vec![sample_commit("a1")], 1, 2)
///     .with_delayed_page(vec![sample_commit("b2")], 2, 2, Duration::from_millis(50));
/// ```
#[derive(Clone, Default)]
pub struct MockBackend {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<SearchCall>>>,
    facet_values: Arc<Mutex<HashMap<String, Vec<String>>>>,
    facet_error: Arc<Mutex<Option<SearchError>>>,
    facet_requests: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, result: Result<Option<SearchPage>>, delay: Duration) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply { result, delay });
        self
    }

    /// Answer the next search with a page.
    pub fn with_page(self, items: Vec<CommitItem>, next_page: u32, page_count: u32) -> Self {
        self.with_delayed_page(items, next_page, page_count, Duration::ZERO)
    }

    /// Answer the next search with a page after `delay`.
    pub fn with_delayed_page(
        self,
        items: Vec<CommitItem>,
        next_page: u32,
        page_count: u32,
        delay: Duration,
    ) -> Self {
        let page = SearchPage {
            items,
            next_page,
            page_count,
        };
        self.push(Ok(Some(page)), delay)
    }

    /// Answer the next search without a body.
    pub fn with_absent(self) -> Self {
        self.push(Ok(None), Duration::ZERO)
    }

    /// Fail the next search.
    pub fn with_error(self, error: SearchError) -> Self {
        self.push(Err(error), Duration::ZERO)
    }

    pub fn with_facet_values(self, facet: &str, values: Vec<&str>) -> Self {
        self.facet_values.lock().unwrap().insert(
            facet.to_string(),
            values.into_iter().map(String::from).collect(),
        );
        self
    }

    /// Fail every facet listing.
    pub fn with_facet_error(self, error: SearchError) -> Self {
        *self.facet_error.lock().unwrap() = Some(error);
        self
    }

    /// All search calls received so far.
    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Facet names requested so far, in order.
    pub fn facet_requests(&self) -> Vec<String> {
        self.facet_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn search(
        &self,
        text: &str,
        filters: &FilterDescriptor,
        page: u32,
    ) -> Result<Option<SearchPage>> {
        self.calls.lock().unwrap().push(SearchCall {
            text: text.to_string(),
            filters: filters.clone(),
            page,
        });

        let reply = self.replies.lock().unwrap().pop_front();
        let Some(reply) = reply else {
            return Ok(Some(SearchPage::default()));
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }

    async fn list_facet_values(&self, facet: &str) -> Result<Vec<String>> {
        self.facet_requests.lock().unwrap().push(facet.to_string());

        if let Some(error) = self.facet_error.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(self
            .facet_values
            .lock()
            .unwrap()
            .get(facet)
            .cloned()
            .unwrap_or_default())
    }
}

/// A commit with placeholder metadata, identified by `hash`.
pub fn sample_commit(hash: &str) -> CommitItem {
    CommitItem {
        hash: hash.to_string(),
        content: format!("Commit {hash}"),
        repository: "vibioh/herodote".to_string(),
        kind: "feat".to_string(),
        component: None,
        date: OffsetDateTime::UNIX_EPOCH,
        remote: "github.com".to_string(),
        breaking: false,
        revert: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_empty() {
        let backend = MockBackend::new()
            .with_page(vec![sample_commit("a")], 1, 2)
            .with_error(SearchError::Transport("boom".to_string()));

        let filters = FilterDescriptor::default();
        let first = backend.search("x", &filters, 0).await.unwrap().unwrap();
        assert_eq!(first.items[0].hash, "a");

        assert!(backend.search("x", &filters, 1).await.is_err());

        let third = backend.search("x", &filters, 0).await.unwrap().unwrap();
        assert!(third.items.is_empty());

        assert_eq!(backend.call_count(), 3);
        assert_eq!(backend.calls()[1].page, 1);
    }
}
