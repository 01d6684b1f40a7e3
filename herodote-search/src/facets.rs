//! Facet catalogue and suggested filter values.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::backend::SearchBackend;
use crate::error::Result;

/// Structured dimensions a commit can be filtered on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Repository,
    Type,
    Component,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Repository, Facet::Type, Facet::Component];
}

/// Known values of one facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetValues {
    pub facet: Facet,
    pub values: Vec<String>,
}

/// Fetch the values of each facet, one request at a time, in the given order.
///
/// Facets without any value are left out. The first failing request aborts
/// the whole load.
pub async fn load_facets(
    backend: &dyn SearchBackend,
    facets: &[Facet],
) -> Result<Vec<FacetValues>> {
    let mut loaded = Vec::with_capacity(facets.len());

    for facet in facets {
        let values = backend.list_facet_values(&facet.to_string()).await?;
        debug!(facet = %facet, count = values.len(), "Loaded facet values");

        if !values.is_empty() {
            loaded.push(FacetValues {
                facet: *facet,
                values,
            });
        }
    }

    Ok(loaded)
}
