//! Client for the hosted search index (Algolia REST protocol).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::SearchBackend;
use crate::config::AlgoliaSettings;
use crate::error::{Result, SearchError};
use crate::filters::FilterDescriptor;
use crate::types::{CommitItem, SearchPage};

const NAME: &str = "hosted-index";
const APPLICATION_HEADER: &str = "X-Algolia-Application-Id";
const API_KEY_HEADER: &str = "X-Algolia-API-Key";

#[derive(Debug, Clone)]
struct IndexHandle {
    host: String,
    app_id: String,
    api_key: String,
    index: String,
}

/// Search backend querying a hosted index with a boolean filter expression.
#[derive(Debug, Clone)]
pub struct HostedIndexBackend {
    client: Client,
    index: Option<IndexHandle>,
}

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct QueryRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    filters: String,
    page: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FacetQueryRequest<'a> {
    facet_query: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    hits: Vec<CommitItem>,
    page: u32,
    nb_pages: u32,
}

impl QueryResponse {
    /// The index pages from zero, so the next page is `page + 1`.
    fn into_page(self) -> SearchPage {
        SearchPage {
            items: self.hits,
            next_page: self.page.saturating_add(1),
            page_count: self.nb_pages,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacetQueryResponse {
    #[serde(default)]
    facet_hits: Vec<FacetHit>,
}

#[derive(Debug, Deserialize)]
struct FacetHit {
    value: String,
}

impl HostedIndexBackend {
    /// Create a client for the configured index.
    ///
    /// Missing credentials are logged once; every call then fails with
    /// [`SearchError::NotConfigured`].
    pub fn new(settings: &AlgoliaSettings) -> Self {
        let index = if settings.app_id.is_empty()
            || settings.api_key.is_empty()
            || settings.index.is_empty()
        {
            warn!("Hosted index credentials not provided");
            None
        } else {
            let host = settings
                .host
                .clone()
                .unwrap_or_else(|| format!("https://{}-dsn.algolia.net", settings.app_id));

            Some(IndexHandle {
                host: host.trim_end_matches('/').to_string(),
                app_id: settings.app_id.clone(),
                api_key: settings.api_key.clone(),
                index: settings.index.clone(),
            })
        };

        Self {
            client: Client::new(),
            index,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.index.is_some()
    }

    fn handle(&self) -> Result<&IndexHandle> {
        self.index
            .as_ref()
            .ok_or_else(|| SearchError::not_configured(NAME, "index not initialized"))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder> {
        let handle = self.handle()?;
        let url = format!(
            "{}/1/indexes/{}/{}",
            handle.host,
            urlencoding::encode(&handle.index),
            path
        );

        Ok(self
            .client
            .post(url)
            .header(APPLICATION_HEADER, &handle.app_id)
            .header(API_KEY_HEADER, &handle.api_key))
    }

    pub(crate) fn query_request<'a>(
        text: &'a str,
        filters: &FilterDescriptor,
        page: u32,
    ) -> QueryRequest<'a> {
        QueryRequest {
            query: text,
            filters: filters.to_index_filter(),
            page,
        }
    }
}

#[async_trait]
impl SearchBackend for HostedIndexBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "index search", skip(self, filters))]
    async fn search(
        &self,
        text: &str,
        filters: &FilterDescriptor,
        page: u32,
    ) -> Result<Option<SearchPage>> {
        let request = Self::query_request(text, filters, page);
        let response = self.post("query")?.json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Backend {
                status: status.as_u16(),
                detail: response.text().await.unwrap_or_default(),
            });
        }

        let response: QueryResponse = response.json().await?;
        Ok(Some(response.into_page()))
    }

    #[instrument(name = "index facets", skip(self))]
    async fn list_facet_values(&self, facet: &str) -> Result<Vec<String>> {
        let path = format!("facets/{}/query", urlencoding::encode(facet));
        let response = self
            .post(&path)?
            .json(&FacetQueryRequest { facet_query: "" })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Backend {
                status: status.as_u16(),
                detail: response.text().await.unwrap_or_default(),
            });
        }

        let response: FacetQueryResponse = response.json().await?;
        Ok(response
            .facet_hits
            .into_iter()
            .map(|hit| hit.value)
            .collect())
    }
}
