//! Client for the first-party REST API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, instrument, warn};

use super::SearchBackend;
use crate::error::{Result, SearchError};
use crate::filters::FilterDescriptor;
use crate::types::{CommitItem, SearchPage};

const NAME: &str = "rest";

/// Search backend talking to `GET /commits` and `GET /filters`.
///
/// Pages are 1-based on the wire and 0-based everywhere else.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitsResponse {
    #[serde(default)]
    results: Vec<CommitItem>,
    page: u32,
    page_count: u32,
}

#[derive(Debug, Deserialize)]
struct FiltersResponse {
    #[serde(default)]
    results: Vec<String>,
}

impl RestBackend {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// An empty or unparsable URL is logged once; every call then fails with
    /// [`SearchError::NotConfigured`].
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');

        let base_url = match Url::parse(trimmed) {
            Ok(_) => Some(trimmed.to_string()),
            Err(e) => {
                warn!(url = %base_url, error = %e, "REST API url is not configured");
                None
            }
        };

        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<String> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| SearchError::not_configured(NAME, "missing API url"))?;
        Ok(format!("{}/{}", base_url, path.trim_start_matches('/')))
    }

    /// Full `/commits` URL for a zero-based page.
    pub fn commits_url(&self, text: &str, filters: &FilterDescriptor, page: u32) -> Result<Url> {
        let mut query = format!("q={}&page={}", urlencoding::encode(text), page + 1);

        for (key, value) in filters.rest_params() {
            query.push('&');
            query.push_str(&urlencoding::encode(&key));
            query.push('=');
            query.push_str(&urlencoding::encode(&value));
        }

        parse_url(format!("{}?{}", self.endpoint("commits")?, query))
    }

    /// Full `/filters` URL for a facet.
    pub fn filters_url(&self, facet: &str) -> Result<Url> {
        parse_url(format!(
            "{}?name={}",
            self.endpoint("filters")?,
            urlencoding::encode(facet)
        ))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        let response = self.client.get(url.clone()).send().await?;
        let response = check_status(response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            debug!(url = %url, "Empty response body");
            return Ok(None);
        }

        Ok(Some(serde_json::from_slice(&body)?))
    }
}

#[async_trait]
impl SearchBackend for RestBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(name = "rest search", skip(self, filters))]
    async fn search(
        &self,
        text: &str,
        filters: &FilterDescriptor,
        page: u32,
    ) -> Result<Option<SearchPage>> {
        let url = self.commits_url(text, filters, page)?;
        let response: Option<CommitsResponse> = self.get(url).await?;

        Ok(response.map(|response| SearchPage {
            items: response.results,
            // The current 1-based page is the next 0-based one
            next_page: response.page,
            page_count: response.page_count,
        }))
    }

    #[instrument(name = "rest filters", skip(self))]
    async fn list_facet_values(&self, facet: &str) -> Result<Vec<String>> {
        let url = self.filters_url(facet)?;
        let response: Option<FiltersResponse> = self.get(url).await?;
        Ok(response.map(|response| response.results).unwrap_or_default())
    }
}

fn parse_url(raw: String) -> Result<Url> {
    Url::parse(&raw).map_err(|e| SearchError::not_configured(NAME, format!("invalid url {raw}: {e}")))
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response.text().await.unwrap_or_default();
    Err(SearchError::Backend {
        status: status.as_u16(),
        detail: detail.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::compile;
    use crate::parser::parse_query;

    fn descriptor(raw: &str) -> (String, FilterDescriptor) {
        let parsed = parse_query(raw);
        let descriptor = compile(&parsed.filters, &parsed.dates);
        (parsed.text, descriptor)
    }

    #[test]
    fn commits_url_end_to_end() {
        let backend = RestBackend::new("http://localhost:1080/");
        let (text, filters) = descriptor("login fix repo:api after:2024-01-01");

        let url = backend.commits_url(&text, &filters, 0).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:1080/commits?q=login%20fix&page=1&repo=api&after=2024-01-01"
        );
    }

    #[test]
    fn commits_url_sends_one_based_pages_and_raw_tokens() {
        let backend = RestBackend::new("https://herodote.example.com/api");
        let (text, filters) =
            descriptor("repo:vibioh/herodote type:fix repo:api before:2021-02-30");

        let url = backend.commits_url(&text, &filters, 2).unwrap();
        assert_eq!(
            url.as_str(),
            "https://herodote.example.com/api/commits?q=&page=3&repo=vibioh%2Fherodote&type=fix&repo=api"
        );
    }

    #[test]
    fn filters_url_encodes_name() {
        let backend = RestBackend::new("http://localhost:1080");
        assert_eq!(
            backend.filters_url("repository").unwrap().as_str(),
            "http://localhost:1080/filters?name=repository"
        );
    }

    #[test]
    fn unconfigured_backend_is_detected() {
        assert!(!RestBackend::new("").is_configured());
        assert!(!RestBackend::new("localhost without scheme").is_configured());
        assert!(RestBackend::new("http://localhost:1080").is_configured());
    }

    #[tokio::test]
    async fn unconfigured_backend_fails_fast() {
        let backend = RestBackend::new("");

        let err = backend
            .search("fix", &FilterDescriptor::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::NotConfigured { backend: "rest", .. }));

        let err = backend.list_facet_values("repository").await.unwrap_err();
        assert!(matches!(err, SearchError::NotConfigured { .. }));
    }
}
