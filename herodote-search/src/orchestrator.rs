//! Search orchestration: debounced, paginated search over one backend.
//!
//! The orchestrator runs as a single task that owns the [`SearchSession`].
//! The UI talks to it through a [`SearchHandle`]: query edits and load-more
//! requests go in over a channel, session snapshots come out over a
//! `watch` channel.
//!
//! Backend calls run as spawned tasks and report back tagged with the
//! generation they were issued for. A response whose generation is no longer
//! current is dropped on arrival; in-flight calls are never aborted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::backend::SearchBackend;
use crate::config::{SearchSettings, DEFAULT_DEBOUNCE_MS};
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::facets::{load_facets, Facet, FacetValues};
use crate::filters::{compile, FilterDescriptor};
use crate::location::{LocationSync, SearchParams};
use crate::parser::parse_query;
use crate::session::{SearchSession, SearchStatus};
use crate::types::SearchPage;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Quiet period before a query edit reaches the backend
    pub debounce: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl From<&SearchSettings> for OrchestratorConfig {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            debounce: settings.debounce(),
        }
    }
}

#[derive(Debug)]
enum Command {
    SetQuery(String),
    LoadMore,
}

/// A backend call to issue for one generation.
#[derive(Debug, Clone, PartialEq)]
struct Dispatch {
    generation: u64,
    page: u32,
    text: String,
    filters: FilterDescriptor,
}

struct Outcome {
    generation: u64,
    page: u32,
    result: Result<Option<SearchPage>>,
}

/// Stateful search engine, see the module docs.
pub struct SearchOrchestrator {
    backend: Option<Arc<dyn SearchBackend>>,
    location: Box<dyn LocationSync>,
    session: SearchSession,
    debouncer: Debouncer<u64>,
    publisher: watch::Sender<SearchSession>,
}

/// Cheap, cloneable front door to a running orchestrator.
#[derive(Clone)]
pub struct SearchHandle {
    commands: mpsc::UnboundedSender<Command>,
    session: watch::Receiver<SearchSession>,
    backend: Option<Arc<dyn SearchBackend>>,
}

impl SearchOrchestrator {
    /// Create an orchestrator over the backend chosen at startup.
    ///
    /// `None` means search is unavailable: queries are still parsed and
    /// written to the location, but the session never leaves `Idle`.
    pub fn new(
        backend: Option<Arc<dyn SearchBackend>>,
        location: impl LocationSync + 'static,
        config: OrchestratorConfig,
    ) -> Self {
        let (publisher, _) = watch::channel(SearchSession::default());

        Self {
            backend,
            location: Box::new(location),
            session: SearchSession::default(),
            debouncer: Debouncer::new(config.debounce),
            publisher,
        }
    }

    /// Start the orchestrator task and evaluate the initial query read from
    /// the location (an empty query when absent).
    pub fn spawn(mut self) -> SearchHandle {
        let (commands, receiver) = mpsc::unbounded_channel();

        let handle = SearchHandle {
            commands,
            session: self.publisher.subscribe(),
            backend: self.backend.clone(),
        };

        let initial = self.location.read_search_param().query.unwrap_or_default();
        self.query_changed(initial);
        self.publish();

        tokio::spawn(self.run(receiver));
        handle
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let (outcome_tx, mut outcomes) = mpsc::unbounded_channel::<Outcome>();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::SetQuery(raw)) => self.query_changed(raw),
                    Some(Command::LoadMore) => {
                        if let Some(dispatch) = self.load_more() {
                            self.dispatch(dispatch, &outcome_tx);
                        }
                    }
                    None => break,
                },
                generation = self.debouncer.settled() => {
                    if let Some(dispatch) = self.settle(generation) {
                        self.dispatch(dispatch, &outcome_tx);
                    }
                }
                Some(outcome) = outcomes.recv() => self.apply(outcome),
            }

            self.publish();
        }

        debug!("Search orchestrator stopped");
    }

    /// Notify subscribers only when the session actually changed.
    fn publish(&self) {
        self.publisher.send_if_modified(|published| {
            if *published == self.session {
                return false;
            }
            *published = self.session.clone();
            true
        });
    }

    fn query_changed(&mut self, raw: String) {
        let session = &mut self.session;

        session.generation += 1;
        session.query = parse_query(&raw);
        session.raw_query = raw;
        session.results.clear();
        session.next_page = 0;
        session.page_count = 0;
        session.error = None;
        session.loading_more = false;
        if self.backend.is_some() {
            session.status = SearchStatus::Pending;
        }

        self.debouncer.arm(session.generation);
    }

    fn settle(&mut self, generation: u64) -> Option<Dispatch> {
        if generation != self.session.generation {
            return None;
        }

        self.location
            .write_search_param(&SearchParams::from_query(&self.session.raw_query));

        self.backend.as_ref()?;
        Some(self.request(0))
    }

    fn load_more(&mut self) -> Option<Dispatch> {
        let session = &self.session;
        let ready = self.backend.is_some()
            && !self.debouncer.is_armed()
            && session.status == SearchStatus::Success
            && !session.loading_more
            && session.next_page < session.page_count;

        if !ready {
            debug!(
                generation = session.generation,
                status = ?session.status,
                loading_more = session.loading_more,
                "Ignoring load more request"
            );
            return None;
        }

        let dispatch = self.request(self.session.next_page);
        self.session.loading_more = true;
        self.session.status = SearchStatus::Pending;
        Some(dispatch)
    }

    fn request(&self, page: u32) -> Dispatch {
        let query = &self.session.query;
        Dispatch {
            generation: self.session.generation,
            page,
            text: query.text.clone(),
            filters: compile(&query.filters, &query.dates),
        }
    }

    fn dispatch(&self, dispatch: Dispatch, outcomes: &mpsc::UnboundedSender<Outcome>) {
        let Some(backend) = self.backend.clone() else {
            return;
        };
        let outcomes = outcomes.clone();

        debug!(
            backend = backend.name(),
            generation = dispatch.generation,
            page = dispatch.page,
            text = %dispatch.text,
            "Dispatching search"
        );

        tokio::spawn(async move {
            let result = backend
                .search(&dispatch.text, &dispatch.filters, dispatch.page)
                .await;

            // The orchestrator may be gone already; nothing left to update then
            let _ = outcomes.send(Outcome {
                generation: dispatch.generation,
                page: dispatch.page,
                result,
            });
        });
    }

    fn apply(&mut self, outcome: Outcome) {
        let session = &mut self.session;

        if outcome.generation != session.generation {
            debug!(
                stale = outcome.generation,
                current = session.generation,
                "Dropping stale search response"
            );
            return;
        }

        session.loading_more = false;

        match outcome.result {
            Ok(page) => {
                // No body: treat as an empty last page
                let page = page.unwrap_or(SearchPage {
                    items: Vec::new(),
                    next_page: outcome.page,
                    page_count: outcome.page,
                });

                if outcome.page == 0 {
                    session.results = page.items;
                } else {
                    session.results.extend(page.items);
                }
                session.next_page = page.next_page;
                session.page_count = page.page_count;
                session.status = SearchStatus::Success;
            }
            Err(e) => {
                warn!(
                    generation = outcome.generation,
                    page = outcome.page,
                    error = %e,
                    "Search failed"
                );
                session.status = SearchStatus::Error;
                session.error = Some(e);
            }
        }
    }
}

impl SearchHandle {
    /// Replace the raw query. Returns `false` if the orchestrator stopped.
    pub fn set_query(&self, raw: impl Into<String>) -> bool {
        self.commands.send(Command::SetQuery(raw.into())).is_ok()
    }

    /// Request the next page of the current query.
    pub fn load_more(&self) -> bool {
        self.commands.send(Command::LoadMore).is_ok()
    }

    /// Latest published session.
    pub fn session(&self) -> SearchSession {
        self.session.borrow().clone()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<SearchSession> {
        self.session.clone()
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Values of the given facets; empty when search is unavailable.
    pub async fn load_facets(&self, facets: &[Facet]) -> Result<Vec<FacetValues>> {
        match &self.backend {
            Some(backend) => load_facets(backend.as_ref(), facets).await,
            None => Ok(Vec::new()),
        }
    }
}
