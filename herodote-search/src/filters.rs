//! Compilation of parsed tokens into a backend-agnostic filter descriptor.

use itertools::Itertools;
use time::{format_description::BorrowedFormatItem, macros::format_description, Date};

use crate::types::{DateBounds, FilterToken};

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const ISO_DATE_LEN: usize = 10;

/// Values of one facet, combined with OR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetGroup {
    pub facet: String,
    pub values: Vec<String>,
}

/// Compiled filters: facet groups are ANDed together, values inside a group
/// are ORed. Dates are only present when they are real calendar dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDescriptor {
    groups: Vec<FacetGroup>,
    tokens: Vec<FilterToken>,
    after: Option<Date>,
    before: Option<Date>,
}

/// Group tokens by facet and validate the date bounds.
///
/// Groups keep the order of each facet's first occurrence, values keep input
/// order. A date that is not exactly `YYYY-MM-DD` or does not exist on the
/// calendar is dropped without error.
pub fn compile(filters: &[FilterToken], dates: &DateBounds) -> FilterDescriptor {
    let mut groups: Vec<FacetGroup> = Vec::new();

    for token in filters {
        match groups.iter_mut().find(|group| group.facet == token.facet) {
            Some(group) => group.values.push(token.value.clone()),
            None => groups.push(FacetGroup {
                facet: token.facet.clone(),
                values: vec![token.value.clone()],
            }),
        }
    }

    FilterDescriptor {
        groups,
        tokens: filters.to_vec(),
        after: dates.after.as_deref().and_then(parse_iso_date),
        before: dates.before.as_deref().and_then(parse_iso_date),
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(raw: &str) -> Option<Date> {
    if raw.len() != ISO_DATE_LEN {
        return None;
    }
    Date::parse(raw, ISO_DATE).ok()
}

impl FilterDescriptor {
    /// True when the descriptor matches everything.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.after.is_none() && self.before.is_none()
    }

    pub fn groups(&self) -> &[FacetGroup] {
        &self.groups
    }

    /// Raw tokens in input order, ungrouped.
    pub fn tokens(&self) -> &[FilterToken] {
        &self.tokens
    }

    pub fn after(&self) -> Option<Date> {
        self.after
    }

    pub fn before(&self) -> Option<Date> {
        self.before
    }

    /// Boolean filter expression understood by the hosted search index.
    ///
    /// Dates are compared against unix seconds at midnight UTC.
    pub fn to_index_filter(&self) -> String {
        let facets = self.groups.iter().map(|group| {
            let alternatives = group
                .values
                .iter()
                .map(|value| format!("{}:{}", group.facet, value))
                .join(" OR ");
            format!("({alternatives})")
        });

        let after = self
            .after
            .map(|date| format!("(date > {})", unix_seconds(date)));
        let before = self
            .before
            .map(|date| format!("(date < {})", unix_seconds(date)));

        facets.chain(after).chain(before).join(" AND ")
    }

    /// Query parameters for the REST API: raw `facet=value` pairs in input
    /// order, then `after`, then `before`.
    pub fn rest_params(&self) -> Vec<(String, String)> {
        let tokens = self
            .tokens
            .iter()
            .map(|token| (token.facet.clone(), token.value.clone()));

        let after = self.after.map(|date| ("after".to_string(), iso(date)));
        let before = self.before.map(|date| ("before".to_string(), iso(date)));

        tokens.chain(after).chain(before).collect()
    }
}

fn unix_seconds(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}

fn iso(date: Date) -> String {
    // Infallible for dates built from the same description
    date.format(ISO_DATE).unwrap_or_default()
}
