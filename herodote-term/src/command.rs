//! Line commands typed at the prompt.

use herodote_search::toggle_filter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the whole query
    Query(String),
    More,
    Facets,
    Toggle { facet: String, value: String },
    After(String),
    Before(String),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Lines starting with `:` are commands, anything
    /// else is a new query.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Query(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match (name, args.as_slice()) {
            ("more" | "m", []) => Ok(Command::More),
            ("facets" | "f", []) => Ok(Command::Facets),
            ("toggle" | "t", [facet, value]) => Ok(Command::Toggle {
                facet: facet.to_string(),
                value: value.to_string(),
            }),
            ("after", []) => Ok(Command::After(String::new())),
            ("after", [date]) => Ok(Command::After(date.to_string())),
            ("before", []) => Ok(Command::Before(String::new())),
            ("before", [date]) => Ok(Command::Before(date.to_string())),
            ("help" | "h", []) => Ok(Command::Help),
            ("quit" | "q", []) => Ok(Command::Quit),
            ("toggle" | "t", _) => Err("usage: :toggle <facet> <value>".to_string()),
            _ => Err(format!("unknown command :{rest}, try :help")),
        }
    }

    /// Query resulting from applying a filter command to `current`, if this
    /// command edits the query at all.
    pub fn edit_query(&self, current: &str) -> Option<String> {
        match self {
            Command::Query(raw) => Some(raw.clone()),
            Command::Toggle { facet, value } => Some(toggle_filter(current, facet, value, false)),
            Command::After(date) => Some(toggle_filter(current, "after", date, true)),
            Command::Before(date) => Some(toggle_filter(current, "before", date, true)),
            _ => None,
        }
    }
}

pub const HELP: &str = "\
<text>                   search, e.g. `login repo:api after:2024-01-01`
:more                    load the next page
:facets                  list known filter values
:toggle <facet> <value>  add or remove a filter
:after <date>            set (or clear) the lower date bound
:before <date>           set (or clear) the upper date bound
:quit                    exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_queries() {
        assert_eq!(
            Command::parse("  login repo:api ").unwrap(),
            Command::Query("login repo:api".to_string())
        );
        assert_eq!(Command::parse("").unwrap(), Command::Query(String::new()));
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(":more").unwrap(), Command::More);
        assert_eq!(Command::parse(":q").unwrap(), Command::Quit);
        assert_eq!(
            Command::parse(":toggle type fix").unwrap(),
            Command::Toggle {
                facet: "type".to_string(),
                value: "fix".to_string()
            }
        );
        assert_eq!(
            Command::parse(":after 2024-01-01").unwrap(),
            Command::After("2024-01-01".to_string())
        );
        assert_eq!(Command::parse(":before").unwrap(), Command::Before(String::new()));
    }

    #[test]
    fn rejects_unknown_or_malformed() {
        assert!(Command::parse(":toggle type").is_err());
        assert!(Command::parse(":nope").is_err());
    }

    #[test]
    fn edits_current_query() {
        let toggle = Command::parse(":toggle repo api").unwrap();
        assert_eq!(toggle.edit_query("fix").as_deref(), Some("fix repo:api"));
        assert_eq!(toggle.edit_query("fix repo:api").as_deref(), Some("fix"));

        let after = Command::parse(":after 2024-01-01").unwrap();
        assert_eq!(
            after.edit_query("fix after:2023-01-01").as_deref(),
            Some("fix after:2024-01-01")
        );

        let clear = Command::parse(":after").unwrap();
        assert_eq!(clear.edit_query("fix after:2023-01-01").as_deref(), Some("fix"));

        assert_eq!(Command::More.edit_query("fix"), None);
    }
}
