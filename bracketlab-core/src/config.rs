//! Loader configuration, read from TOML.
//!
//! Every field has a default, so an empty file is a valid config:
//!
//! ```toml
//! base_url = "https://barttorvik.com"
//! cache_path = "ncaa_tournament_teams.csv"
//! timeout_secs = 30
//! years = [2017, 2018, 2019, 2021]
//! ```

use crate::data::cache::DEFAULT_CACHE_FILE;
use crate::data::loader::DEFAULT_YEARS;
use crate::data::torvik::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Site root; the standings page is `{base_url}/trank.php`.
    pub base_url: String,
    pub cache_path: PathBuf,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Seasons loaded when the caller doesn't name any.
    pub years: Vec<i32>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            timeout_secs: 30,
            user_agent: concat!("bracketlab/", env!("CARGO_PKG_VERSION")).to_string(),
            years: DEFAULT_YEARS.to_vec(),
        }
    }
}

impl LoaderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(LoaderConfig::from_toml_str("").unwrap(), LoaderConfig::default());
    }

    #[test]
    fn defaults_match_published_seasons() {
        let config = LoaderConfig::default();
        assert_eq!(config.years, [2017, 2018, 2019, 2021]);
        assert_eq!(config.cache_path, PathBuf::from("ncaa_tournament_teams.csv"));
        assert_eq!(config.base_url, "https://barttorvik.com");
    }

    #[test]
    fn partial_override() {
        let config = LoaderConfig::from_toml_str(
            r#"
            years = [2022, 2023]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.years, [2022, 2023]);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_wrong_types() {
        let err = LoaderConfig::from_toml_str("years = \"2021\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LoaderConfig::load(Path::new("/nonexistent/bracketlab.toml")).unwrap_err();
        assert!(err.to_string().contains("bracketlab.toml"));
    }
}
