use std::{path::Path, str::FromStr, time::Duration};

use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};

use crate::facets::Facet;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(Deserialize, Clone, Debug, Default)]
pub struct Settings {
    /// First-party REST API, preferred when present
    pub api: Option<ApiSettings>,
    /// Hosted search index
    pub algolia: Option<AlgoliaSettings>,
    #[serde(default)]
    pub search: SearchSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    #[serde(default)]
    pub url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AlgoliaSettings {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub index: String,
    /// Overrides `https://{app_id}-dsn.algolia.net`
    pub host: Option<String>,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct SearchSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_facets")]
    pub facets: Vec<Facet>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            facets: default_facets(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_facets() -> Vec<Facet> {
    Facet::ALL.to_vec()
}

/// Read settings from `config/base.yaml`, `config/{environment}.yaml` and
/// `HERODOTE_*` environment variables, in increasing priority.
///
/// Both files are optional. Nested keys use a double underscore, e.g.
/// `HERODOTE_API__URL` or `HERODOTE_ALGOLIA__API_KEY`.
pub fn read_config(config_directory: &Path) -> Result<Settings, config::ConfigError> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".into());
    let environment = Environment::from_str(&environment).map_err(|_| {
        config::ConfigError::Message(format!("Unknown APP_ENVIRONMENT: {environment}"))
    })?;
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(config_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("HERODOTE")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// Read settings from `./config`. Callers load `.env` beforehand.
pub fn load() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("No current directory: {e}")))?;
    read_config(&base_path.join("config"))
}

#[derive(Display, Debug, EnumString, PartialEq, Eq)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(Environment::from_str("LOCAL").unwrap(), Environment::Local);
        assert_eq!(
            Environment::from_str("production").unwrap(),
            Environment::Production
        );
        assert!(Environment::from_str("staging").is_err());
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn search_settings_defaults() {
        let settings = SearchSettings::default();
        assert_eq!(settings.debounce(), Duration::from_millis(300));
        assert_eq!(
            settings.facets,
            vec![Facet::Repository, Facet::Type, Facet::Component]
        );
    }

    #[test]
    fn settings_deserialize_from_yaml() {
        let yaml = r#"
api:
  url: http://localhost:1080
search:
  debounce_ms: 150
  facets: [repository, component]
"#;
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.api.unwrap().url, "http://localhost:1080");
        assert!(settings.algolia.is_none());
        assert_eq!(settings.search.debounce_ms, 150);
        assert_eq!(
            settings.search.facets,
            vec![Facet::Repository, Facet::Component]
        );
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let settings: Settings = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(settings.api.is_none());
        assert!(settings.algolia.is_none());
        assert_eq!(settings.search.debounce_ms, DEFAULT_DEBOUNCE_MS);
    }
}
