//! Synchronisation of the settled query with the page location.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const QUERY_KEY: &str = "query";

/// Search parameters persisted in the location's query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: Option<String>,
}

impl SearchParams {
    /// Params for a raw query, omitting it when empty.
    pub fn from_query(raw: &str) -> Self {
        Self {
            query: (!raw.is_empty()).then(|| raw.to_string()),
        }
    }
}

/// Where the current query is read from on load and written to once settled.
pub trait LocationSync: Send {
    fn read_search_param(&self) -> SearchParams;
    fn write_search_param(&mut self, params: &SearchParams);
}

/// Decode a `?key=value&flag` query string. Keys without a value map to
/// `"true"`.
pub fn parse_search(search: &str) -> HashMap<String, String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            if key.is_empty() {
                return None;
            }
            let value = match parts.next() {
                Some(value) => urlencoding::decode(value)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| value.to_string()),
                None => "true".to_string(),
            };
            Some((key.to_string(), value))
        })
        .collect()
}

/// Encode params as `?key=value&...`, skipping empty values. Returns an empty
/// string when nothing is left.
pub fn encode_search(params: &[(&str, &str)]) -> String {
    let encoded: Vec<String> = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();

    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{}", encoded.join("&"))
    }
}

/// In-memory location holding a query string such as `?query=repo%3Aapi`.
///
/// Clones share the same string, so a front end can keep one to observe what
/// the orchestrator writes.
#[derive(Debug, Clone, Default)]
pub struct QueryStringLocation {
    search: Arc<Mutex<String>>,
}

impl QueryStringLocation {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: Arc::new(Mutex::new(search.into())),
        }
    }

    /// Current query string, including the leading `?` when not empty.
    pub fn search(&self) -> String {
        self.search
            .lock()
            .map(|search| search.clone())
            .unwrap_or_default()
    }
}

impl LocationSync for QueryStringLocation {
    fn read_search_param(&self) -> SearchParams {
        let mut params = parse_search(&self.search());
        SearchParams {
            query: params.remove(QUERY_KEY).filter(|query| !query.is_empty()),
        }
    }

    fn write_search_param(&mut self, params: &SearchParams) {
        let encoded = encode_search(&[(QUERY_KEY, params.query.as_deref().unwrap_or_default())]);
        if let Ok(mut search) = self.search.lock() {
            *search = encoded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_search_decodes_values() {
        let params = parse_search("?query=repo%3Aapi%20fix&debug");
        assert_eq!(params.get("query").map(String::as_str), Some("repo:api fix"));
        assert_eq!(params.get("debug").map(String::as_str), Some("true"));
    }

    #[test]
    fn encode_search_skips_empty_values() {
        assert_eq!(encode_search(&[("query", "")]), "");
        assert_eq!(
            encode_search(&[("query", "repo:api fix"), ("page", "")]),
            "?query=repo%3Aapi%20fix"
        );
    }

    #[test]
    fn location_round_trip() {
        let mut location = QueryStringLocation::new("");
        assert_eq!(location.read_search_param(), SearchParams::default());

        location.write_search_param(&SearchParams::from_query("type:fix login"));
        assert_eq!(location.search(), "?query=type%3Afix%20login");
        assert_eq!(
            location.read_search_param().query.as_deref(),
            Some("type:fix login")
        );

        location.write_search_param(&SearchParams::from_query(""));
        assert_eq!(location.search(), "");
    }

    #[test]
    fn clones_share_state() {
        let observer = QueryStringLocation::new("?query=a");
        let mut writer = observer.clone();
        writer.write_search_param(&SearchParams::from_query("b"));
        assert_eq!(observer.search(), "?query=b");
    }
}
