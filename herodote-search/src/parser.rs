//! Query parser for extracting `facet:value` tokens from free text.
//!
//! Transforms queries like `"login fix repo:api after:2024-01-01"` into the
//! plain search text plus structured filters and date bounds.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{DateBounds, FilterToken, ParsedQuery};

const AFTER: &str = "after";
const BEFORE: &str = "before";

// A whitespace-delimited word with at least one character on each side of a
// colon. The facet stops at the first colon that has a value after it.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\S+?):(\S+)$").unwrap());

/// Parse a raw query into search text, filter tokens and date bounds.
///
/// Never fails: words that do not match the token grammar (`repo:`, `:api`)
/// stay in the search text.
///
/// # Examples
///
/// ```
/// use herodote_search::parse_query;
///
/// let parsed = parse_query("login fix repo:api after:2024-01-01");
/// assert_eq!(parsed.text, "login fix");
/// assert_eq!(parsed.filters[0].facet, "repo");
/// assert_eq!(parsed.dates.after.as_deref(), Some("2024-01-01"));
/// ```
pub fn parse_query(raw: &str) -> ParsedQuery {
    let mut words = Vec::new();
    let mut filters = Vec::new();
    let mut dates = DateBounds::default();

    for word in raw.split_whitespace() {
        match split_token(word) {
            Some((AFTER, value)) => dates.after = Some(value.to_string()),
            Some((BEFORE, value)) => dates.before = Some(value.to_string()),
            Some((facet, value)) => filters.push(FilterToken::new(facet, value)),
            None => words.push(word),
        }
    }

    ParsedQuery {
        text: words.join(" "),
        filters,
        dates,
    }
}

/// Toggle a `facet:value` token in a raw query.
///
/// For `unique` facets (date bounds) the existing value is replaced, or
/// removed when `value` is empty. For other facets an existing identical token
/// is removed and a missing one is appended.
pub fn toggle_filter(query: &str, facet: &str, value: &str, unique: bool) -> String {
    let target = format!("{facet}:{value}");
    let words: Vec<&str> = query.split_whitespace().collect();

    let has_facet = words
        .iter()
        .any(|word| matches!(split_token(word), Some((f, _)) if f == facet));

    if unique {
        let mut replaced = false;
        let mut result = Vec::with_capacity(words.len() + 1);

        for &word in &words {
            match split_token(word) {
                Some((f, _)) if f == facet => {
                    if !replaced && !value.is_empty() {
                        result.push(target.as_str());
                    }
                    replaced = true;
                }
                _ => result.push(word),
            }
        }

        if !has_facet && !value.is_empty() {
            result.push(target.as_str());
        }

        return result.join(" ");
    }

    if value.is_empty() {
        return words.join(" ");
    }

    if words.contains(&target.as_str()) {
        words
            .into_iter()
            .filter(|word| *word != target)
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        let mut result = words;
        result.push(&target);
        result.join(" ")
    }
}

fn split_token(word: &str) -> Option<(&str, &str)> {
    let captures = TOKEN_PATTERN.captures(word)?;
    let facet = captures.get(1)?.as_str();
    let value = captures.get(2)?.as_str();
    Some((facet, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_query() {
        let parsed = parse_query("");
        assert_eq!(parsed, ParsedQuery::default());

        let parsed = parse_query("   \t  ");
        assert_eq!(parsed.text, "");
        assert!(parsed.filters.is_empty());
        assert!(parsed.dates.is_empty());
    }

    #[test]
    fn parse_simple_text() {
        let parsed = parse_query("  login   fix ");
        assert_eq!(parsed.text, "login fix");
        assert!(parsed.filters.is_empty());
    }

    #[test]
    fn parse_end_to_end_example() {
        let parsed = parse_query("login fix repo:api after:2024-01-01");
        assert_eq!(parsed.text, "login fix");
        assert_eq!(parsed.filters, vec![FilterToken::new("repo", "api")]);
        assert_eq!(parsed.dates.after.as_deref(), Some("2024-01-01"));
        assert_eq!(parsed.dates.before, None);
    }

    #[test]
    fn parse_keeps_duplicates_in_order() {
        let parsed = parse_query("type:fix repo:api type:feat type:fix");
        assert_eq!(
            parsed.filters,
            vec![
                FilterToken::new("type", "fix"),
                FilterToken::new("repo", "api"),
                FilterToken::new("type", "feat"),
                FilterToken::new("type", "fix"),
            ]
        );
        assert_eq!(parsed.text, "");
    }

    #[test]
    fn parse_last_date_wins() {
        let parsed = parse_query("before:2020-01-01 crash before:2021-01-01");
        assert_eq!(parsed.dates.before.as_deref(), Some("2021-01-01"));
        assert_eq!(parsed.text, "crash");
    }

    #[test]
    fn parse_malformed_date_is_still_stripped() {
        let parsed = parse_query("after:2021-2-28 deploy");
        assert_eq!(parsed.dates.after.as_deref(), Some("2021-2-28"));
        assert_eq!(parsed.text, "deploy");
    }

    #[test]
    fn parse_leaves_incomplete_tokens_in_text() {
        let parsed = parse_query("repo: :api fix");
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.text, "repo: :api fix");
    }

    #[test]
    fn parse_facet_may_start_with_colon() {
        let parsed = parse_query(":a:b fix ::x");
        assert_eq!(
            parsed.filters,
            vec![FilterToken::new(":a", "b"), FilterToken::new(":", "x")]
        );
        assert_eq!(parsed.text, "fix");
    }

    #[test]
    fn parse_text_never_holds_a_token() {
        let token = Regex::new(r"\S+:\S+").unwrap();
        for raw in [
            ":a:b fix",
            "::x",
            "repo: :api fix",
            "a:b:c d: :e ::",
            "type:fix\tafter:2024-01-01 login",
        ] {
            let parsed = parse_query(raw);
            assert!(
                !token.is_match(&parsed.text),
                "text {:?} of {:?} still holds a token",
                parsed.text,
                raw
            );
        }
    }

    #[test]
    fn parse_value_may_contain_colons() {
        let parsed = parse_query("component:a:b");
        assert_eq!(parsed.filters, vec![FilterToken::new("component", "a:b")]);
    }

    #[test]
    fn parse_round_trips_modulo_whitespace() {
        let raw = "fix  repo:api the\tlogin type:feat   flow";
        let parsed = parse_query(raw);

        let words: Vec<&str> = raw.split_whitespace().collect();
        let (tokens, text): (Vec<&str>, Vec<&str>) =
            words.iter().copied().partition(|word| word.contains(':'));

        assert_eq!(parsed.text, text.join(" "));
        assert_eq!(parsed.text, "fix the login flow");

        let rebuilt: Vec<String> = parsed.filters.iter().map(ToString::to_string).collect();
        assert_eq!(rebuilt, tokens);
    }

    #[test]
    fn toggle_appends_missing_filter() {
        assert_eq!(toggle_filter("fix", "repo", "api", false), "fix repo:api");
        assert_eq!(toggle_filter("", "repo", "api", false), "repo:api");
        assert_eq!(
            toggle_filter("repo:api", "repo", "web", false),
            "repo:api repo:web"
        );
    }

    #[test]
    fn toggle_removes_present_filter() {
        assert_eq!(
            toggle_filter("fix repo:api  login", "repo", "api", false),
            "fix login"
        );
    }

    #[test]
    fn toggle_matches_whole_tokens() {
        assert_eq!(
            toggle_filter("repo:api2", "repo", "api", false),
            "repo:api2 repo:api"
        );
    }

    #[test]
    fn toggle_unique_replaces_value() {
        assert_eq!(
            toggle_filter("fix after:2020-01-01 login", "after", "2021-01-01", true),
            "fix after:2021-01-01 login"
        );
        assert_eq!(
            toggle_filter("fix", "after", "2021-01-01", true),
            "fix after:2021-01-01"
        );
    }

    #[test]
    fn toggle_unique_removes_on_empty_value() {
        assert_eq!(toggle_filter("fix after:2020-01-01", "after", "", true), "fix");
        assert_eq!(toggle_filter("fix", "after", "", true), "fix");
    }
}
