//! Search backends and the startup choice between them.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::filters::FilterDescriptor;
use crate::types::SearchPage;

mod hosted;
pub mod mock;
mod rest;

pub use hosted::HostedIndexBackend;
pub use rest::RestBackend;

/// Uniform contract over the REST API and the hosted search index.
///
/// Both variants fail with [`SearchError::NotConfigured`](crate::SearchError)
/// when they lack configuration, which is distinct from `Ok` with an empty
/// page.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch one zero-based page of commits.
    ///
    /// `Ok(None)` means the backend answered without a result body.
    async fn search(
        &self,
        text: &str,
        filters: &FilterDescriptor,
        page: u32,
    ) -> Result<Option<SearchPage>>;

    /// List the known values of a facet, e.g. every repository name.
    async fn list_facet_values(&self, facet: &str) -> Result<Vec<String>>;
}

/// The backend selected once at startup.
pub enum Backend {
    Rest(RestBackend),
    HostedIndex(HostedIndexBackend),
    /// Search is permanently off for this session.
    Unavailable,
}

impl Backend {
    /// Resolve the configured backend, preferring the REST API.
    ///
    /// A configured backend that lacks credentials is reported once here and
    /// resolves to [`Backend::Unavailable`].
    pub fn from_settings(settings: &Settings) -> Self {
        if let Some(api) = settings.api.as_ref().filter(|api| !api.url.trim().is_empty()) {
            let backend = RestBackend::new(&api.url);
            if backend.is_configured() {
                info!(url = %api.url, "Using REST search backend");
                return Backend::Rest(backend);
            }
            return Backend::Unavailable;
        }

        if let Some(algolia) = settings.algolia.as_ref() {
            let backend = HostedIndexBackend::new(algolia);
            if backend.is_configured() {
                info!(index = %algolia.index, "Using hosted index search backend");
                return Backend::HostedIndex(backend);
            }
            return Backend::Unavailable;
        }

        warn!("No search backend configured, search is unavailable");
        Backend::Unavailable
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Rest(backend) => backend.name(),
            Backend::HostedIndex(backend) => backend.name(),
            Backend::Unavailable => "unavailable",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Backend::Unavailable)
    }

    /// Shared handle for issuing calls, `None` when unavailable.
    pub fn into_shared(self) -> Option<Arc<dyn SearchBackend>> {
        match self {
            Backend::Rest(backend) => Some(Arc::new(backend)),
            Backend::HostedIndex(backend) => Some(Arc::new(backend)),
            Backend::Unavailable => None,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Backend").field(&self.name()).finish()
    }
}
