//! Core types for commit search.

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// A `facet:value` pair extracted from a raw query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterToken {
    pub facet: String,
    pub value: String,
}

impl FilterToken {
    pub fn new(facet: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            facet: facet.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for FilterToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.facet, self.value)
    }
}

/// Date bounds as typed by the user. Values are not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub after: Option<String>,
    pub before: Option<String>,
}

impl DateBounds {
    pub fn is_empty(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }
}

/// Parsed search query with extracted filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Remaining search text after token extraction
    pub text: String,
    /// Facet tokens in input order, duplicates kept
    pub filters: Vec<FilterToken>,
    /// `after:` / `before:` bounds, last occurrence wins
    pub dates: DateBounds,
}

/// A commit record as returned by either backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitItem {
    pub hash: String,
    pub content: String,
    pub repository: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub component: Option<String>,
    /// Unix seconds from the hosted index, RFC 3339 from the REST API
    #[serde(
        deserialize_with = "deserialize_commit_date",
        serialize_with = "time::serde::rfc3339::serialize"
    )]
    pub date: OffsetDateTime,
    pub remote: String,
    #[serde(default)]
    pub breaking: bool,
    #[serde(default)]
    pub revert: bool,
}

impl CommitItem {
    /// Link to the commit on its forge.
    pub fn url(&self) -> String {
        format!(
            "https://{}/{}/commit/{}",
            self.remote, self.repository, self.hash
        )
    }
}

/// One page of results, normalized to zero-based paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<CommitItem>,
    /// Zero-based index of the page that follows this one
    pub next_page: u32,
    pub page_count: u32,
}

impl SearchPage {
    pub fn has_more(&self) -> bool {
        self.next_page < self.page_count
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn deserialize_commit_date<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Timestamp(i64),
        Text(String),
    }

    match RawDate::deserialize(deserializer)? {
        RawDate::Timestamp(seconds) => {
            OffsetDateTime::from_unix_timestamp(seconds).map_err(serde::de::Error::custom)
        }
        RawDate::Text(text) => {
            OffsetDateTime::parse(&text, &time::format_description::well_known::Rfc3339)
                .map_err(serde::de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn filter_token_display() {
        assert_eq!(FilterToken::new("repo", "api").to_string(), "repo:api");
    }

    #[test]
    fn commit_date_from_unix_seconds() {
        let commit: CommitItem = serde_json::from_value(serde_json::json!({
            "hash": "1a2bc34d",
            "content": "Add README.md",
            "repository": "vibioh/herodote",
            "type": "feat",
            "component": "",
            "date": 1596913344,
            "remote": "github.com",
        }))
        .unwrap();

        assert_eq!(commit.date, datetime!(2020-08-08 19:02:24 UTC));
        assert_eq!(commit.component, None);
        assert!(!commit.breaking);
    }

    #[test]
    fn commit_date_from_rfc3339() {
        let commit: CommitItem = serde_json::from_value(serde_json::json!({
            "hash": "1a2bc34d",
            "content": "Add README.md",
            "repository": "vibioh/herodote",
            "type": "fix",
            "component": "api",
            "date": "2020-08-08T19:02:24Z",
            "remote": "github.com",
            "revert": true,
        }))
        .unwrap();

        assert_eq!(commit.date, datetime!(2020-08-08 19:02:24 UTC));
        assert_eq!(commit.component.as_deref(), Some("api"));
        assert!(commit.revert);
    }

    #[test]
    fn commit_url() {
        let commit: CommitItem = serde_json::from_value(serde_json::json!({
            "hash": "1a2bc34d",
            "content": "Add README.md",
            "repository": "vibioh/herodote",
            "type": "feat",
            "date": 0,
            "remote": "github.com",
        }))
        .unwrap();

        assert_eq!(
            commit.url(),
            "https://github.com/vibioh/herodote/commit/1a2bc34d"
        );
    }

    #[test]
    fn page_has_more() {
        let page = SearchPage {
            items: vec![],
            next_page: 1,
            page_count: 3,
        };
        assert!(page.has_more());

        let last = SearchPage {
            next_page: 3,
            ..page
        };
        assert!(!last.has_more());
    }
}
