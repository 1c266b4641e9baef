//! Read-side client for the cold telemetry log (§6.1: "ColdLog: append-only,
//! SQL-queryable; schema-less ingestion per stream"). Grounded on
//! `hip3-registry::client::MetaClient`'s client-builder-with-timeout and
//! GET-and-classify pattern, here reading a stream back out instead of
//! fetching exchange metadata.

use crate::error::Result;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct ColdLogQueryClient {
    client: Client,
    base_url: String,
    org: Option<String>,
    token: Option<String>,
}

impl ColdLogQueryClient {
    pub fn new(base_url: impl Into<String>, org: Option<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            org,
            token,
        })
    }

    /// Fetches the most recent `limit` records from `stream` for `pair_id`,
    /// newest last (the cold log's own ordering; this client does not
    /// re-sort).
    pub async fn query(&self, stream: &str, pair_id: &str, limit: Option<u32>) -> Result<Vec<Value>> {
        let mut req = self
            .client
            .get(format!("{}/query", self.base_url.trim_end_matches('/')))
            .query(&[
                ("stream", stream),
                ("pairId", pair_id),
                ("limit", &limit.unwrap_or(DEFAULT_LIMIT).to_string()),
            ]);
        if let Some(org) = &self.org {
            req = req.query(&[("org", org.as_str())]);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let response = req.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Builds a `ColdLogQueryClient` from `DashboardConfig`, or `None` if
/// `COLD_LOG_URL` is unset (mirrors telemetry's own disabled-when-unset rule).
pub fn from_config(config: &crate::config::DashboardConfig) -> Option<Result<ColdLogQueryClient>> {
    let url = config.cold_log_url.clone()?;
    Some(ColdLogQueryClient::new(
        url,
        config.cold_log_org.clone(),
        config.cold_log_token.clone(),
    ))
}
