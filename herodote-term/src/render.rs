//! Plain-text rendering of search sessions.

use herodote_search::{CommitItem, FacetValues, SearchSession, SearchStatus};
use time::{Date, OffsetDateTime};

/// "Today", "1 day ago" or "N days ago", comparing calendar days in UTC.
pub fn day_label(date: OffsetDateTime, today: Date) -> String {
    let days = (today - date.date()).whole_days();
    match days {
        i64::MIN..=0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{n} days ago"),
    }
}

fn commit_line(commit: &CommitItem) -> String {
    let kind = match &commit.component {
        Some(component) => format!("{}({})", commit.kind, component),
        None => commit.kind.clone(),
    };
    let breaking = if commit.breaking { "!" } else { "" };

    format!(
        "  {} {}{} {}\n    {}",
        commit.repository,
        kind,
        breaking,
        commit.content,
        commit.url()
    )
}

/// Result list grouped under day separators.
pub fn results(commits: &[CommitItem], today: Date) -> Vec<String> {
    if commits.is_empty() {
        return vec!["No entry found".to_string()];
    }

    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for commit in commits {
        let label = day_label(commit.date, today);
        if current.as_ref() != Some(&label) {
            lines.push(format!("-- {label} --"));
            current = Some(label);
        }
        lines.push(commit_line(commit));
    }

    lines
}

/// Lines describing a settled session, or `None` while nothing is worth
/// printing.
pub fn session(session: &SearchSession, today: Date) -> Option<Vec<String>> {
    match session.status {
        SearchStatus::Idle | SearchStatus::Pending => None,
        SearchStatus::Error => {
            let reason = session
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            Some(vec![format!("Search failed: {reason}")])
        }
        SearchStatus::Success => {
            let mut lines = results(&session.results, today);
            if session.has_more() {
                lines.push(format!(
                    "page {}/{}, :more for the next one",
                    session.next_page, session.page_count
                ));
            }
            Some(lines)
        }
    }
}

pub fn facets(facets: &[FacetValues]) -> Vec<String> {
    if facets.is_empty() {
        return vec!["No filter available".to_string()];
    }

    facets
        .iter()
        .map(|group| format!("{}: {}", group.facet, group.values.join(", ")))
        .collect()
}
