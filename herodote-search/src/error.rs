//! Error type for search operations.

/// Failures surfaced by backends and the orchestrator.
///
/// Parsing and filter compilation never fail, so every variant here comes from
/// configuration or from talking to a backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("{backend} backend is not configured: {reason}")]
    NotConfigured {
        backend: &'static str,
        reason: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend returned {status}: {detail}")]
    Backend { status: u16, detail: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl SearchError {
    pub(crate) fn not_configured(backend: &'static str, reason: impl Into<String>) -> Self {
        SearchError::NotConfigured {
            backend,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SearchError::Decode(e.to_string())
        } else {
            SearchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self {
        SearchError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_message_names_backend() {
        let err = SearchError::not_configured("rest", "missing base url");
        assert_eq!(
            err.to_string(),
            "rest backend is not configured: missing base url"
        );
    }

    #[test]
    fn backend_error_keeps_raw_detail() {
        let err = SearchError::Backend {
            status: 500,
            detail: "database is down".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 500: database is down");
    }
}
