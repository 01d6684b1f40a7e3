//! Herodote Search - Interactive search over conventional commits.
//!
//! This crate turns a free-text query into paginated commit results from a
//! remote search backend:
//! - **Query parsing** of `facet:value` filters and `after:`/`before:` dates
//! - **Filter compilation** into a hosted index expression or REST parameters
//! - **Debounced orchestration** with pagination and stale response rejection
//!
//! # Architecture
//!
//! The orchestrator is built around trait abstractions for testability:
//!
//! - [`SearchBackend`] - Remote search (REST API, hosted index, mocks)
//! - [`LocationSync`] - Where the settled query is persisted
//!
//! # Example
//!
//! ```ignore
//! use herodote_search::{config, Backend, OrchestratorConfig, QueryStringLocation, SearchOrchestrator};
//!
//! let settings = config::load()?;
//! let backend = Backend::from_settings(&settings).into_shared();
//! let location = QueryStringLocation::new("?query=type%3Afeat");
//! let handle = SearchOrchestrator::new(backend, location, OrchestratorConfig::from(&settings.search)).spawn();
//!
//! handle.set_query("login repo:api after:2024-01-01");
//! let session = handle.session();
//! ```
//!
//! # Query Syntax
//!
//! Whitespace-separated words of the form `facet:value` are filters, the rest
//! is free text:
//!
//! ```
//! let query = herodote_search::parse_query("fix login type:fix repo:api after:2024-01-01");
//! assert_eq!(query.text, "fix login");
//! assert_eq!(query.filters.len(), 2);
//! assert_eq!(query.dates.after.as_deref(), Some("2024-01-01"));
//! ```
//!
//! See [`parse_query`] and [`toggle_filter`].

mod debounce;
mod error;
mod facets;
mod filters;
mod location;
mod orchestrator;
mod parser;
mod session;
mod types;

pub mod backend;
pub mod config;

pub use backend::{Backend, SearchBackend};
pub use debounce::Debouncer;
pub use error::{Result, SearchError};
pub use facets::{load_facets, Facet, FacetValues};
pub use filters::{compile, parse_iso_date, FacetGroup, FilterDescriptor};
pub use location::{encode_search, parse_search, LocationSync, QueryStringLocation, SearchParams};
pub use orchestrator::{OrchestratorConfig, SearchHandle, SearchOrchestrator};
pub use parser::{parse_query, toggle_filter};
pub use session::{SearchSession, SearchStatus};
pub use types::{CommitItem, DateBounds, FilterToken, ParsedQuery, SearchPage};
