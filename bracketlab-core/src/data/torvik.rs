//! barttorvik.com T-Rank standings source.
//!
//! One blocking GET per season against `trank.php`. Transport failures and
//! non-success statuses are returned as-is; there is no retry.

use super::provider::{DataError, StandingsSource};
use crate::config::LoaderConfig;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://barttorvik.com";

/// Standings source backed by the live site.
pub struct TorvikSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TorvikSource {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &LoaderConfig) -> Result<Self, DataError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )
    }

    /// Standings endpoint; the query carries the season plus fixed all/none filters.
    fn standings_url(&self) -> String {
        format!("{}/trank.php", self.base_url.trim_end_matches('/'))
    }

    fn standings_query(year: i32) -> [(&'static str, String); 6] {
        [
            ("year", year.to_string()),
            ("sort", String::new()),
            ("top", "0".into()),
            ("conlimit", "All".into()),
            ("venue", "All".into()),
            ("type", "All".into()),
        ]
    }
}

impl StandingsSource for TorvikSource {
    fn name(&self) -> &str {
        "barttorvik"
    }

    fn fetch_year(&self, year: i32) -> Result<String, DataError> {
        let url = self.standings_url();
        debug!(%url, year, "requesting standings page");

        let body = self
            .client
            .get(&url)
            .query(&Self::standings_query(year))
            .send()?
            .error_for_status()?
            .text()?;

        Ok(body)
    }
}
