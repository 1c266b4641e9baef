//! Cold-log transport: HTTP POST against `COLD_LOG_URL`, mirroring the
//! corpus's `reqwest`-based collaborator clients (e.g.
//! `hip3-registry::client::MetaClient`) rather than a local file sink.

use crate::error::{Result, TelemetryError};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Abstracts the wire transport so the sink's buffering/replay logic can be
/// tested without a live HTTP endpoint.
pub trait ColdLogTransport: Send + Sync {
    fn send(
        &self,
        stream: &str,
        records: &[Value],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// `reqwest`-backed transport posting `{stream, records}` batches to
/// `COLD_LOG_URL`, classifying non-2xx responses the way `MetaClient` does.
pub struct HttpColdLogTransport {
    client: reqwest::Client,
    url: String,
    org: Option<String>,
    token: Option<String>,
}

impl HttpColdLogTransport {
    pub fn new(url: impl Into<String>, org: Option<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.into(),
            org,
            token,
        }
    }
}

/// Transport used when `COLD_LOG_URL` is unset (§6.3: "disabled when
/// unset"). Accepts and discards every batch instead of refusing to start a
/// sink at all.
pub struct NoopColdLogTransport;

impl ColdLogTransport for NoopColdLogTransport {
    fn send(
        &self,
        _stream: &str,
        _records: &[Value],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async { Ok(()) })
    }
}

impl ColdLogTransport for HttpColdLogTransport {
    fn send(
        &self,
        stream: &str,
        records: &[Value],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let body = serde_json::json!({ "stream": stream, "records": records });
        Box::pin(async move {
            let mut request = self.client.post(&self.url).json(&body);
            if let Some(org) = &self.org {
                request = request.header("X-Cold-Log-Org", org);
            }
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| TelemetryError::Transport(e.to_string()))?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(TelemetryError::Transport(format!(
                    "cold log rejected batch with status {}",
                    response.status()
                )))
            }
        })
    }
}
