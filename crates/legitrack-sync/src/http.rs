//! HTTP client for the LegiScan API (`getSearchRaw` and `getBill`).

use std::time::Duration;

use async_trait::async_trait;
use legitrack_core::bill::{lenient_string, lenient_vec};
use legitrack_core::{BillRecord, BillSource, SearchHit};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("API status not OK: {status} {message}")]
    Status { status: String, message: String },
}

/// LegiScan API client.
///
/// The [`BillSource`] impl fails soft: every error is logged and turned into
/// an empty result. Use [`try_search`](Self::try_search) and
/// [`try_fetch`](Self::try_fetch) to see the error itself.
pub struct LegiScanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default, deserialize_with = "lenient_string")]
    status: String,
    #[serde(default)]
    alert: Option<Value>,
    #[serde(default)]
    searchresult: Option<SearchResult>,
    #[serde(default)]
    bill: Option<Value>,
}

#[derive(Deserialize, Default)]
struct SearchResult {
    #[serde(default, deserialize_with = "lenient_vec")]
    results: Vec<RawHit>,
}

#[derive(Deserialize)]
struct RawHit {
    #[serde(deserialize_with = "lenient_string")]
    bill_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    change_hash: String,
    #[serde(default)]
    relevance: Option<Value>,
}

impl RawHit {
    fn into_hit(self) -> SearchHit {
        let relevance = self
            .relevance
            .as_ref()
            .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            .unwrap_or(0.0);
        SearchHit {
            record_id: self.bill_id,
            fingerprint: self.change_hash,
            relevance: relevance.max(0.0) as u32,
        }
    }
}

impl LegiScanClient {
    /// Create a client for `base_url` (e.g. `https://api.legiscan.com/`).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("legitrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn call(&self, params: &[(&str, &str)]) -> Result<Envelope, ApiError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let envelope: Envelope = serde_json::from_slice(&bytes)?;
        if envelope.status != "OK" {
            let message = envelope
                .alert
                .as_ref()
                .and_then(|a| a.get("message"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(ApiError::Status {
                status: envelope.status,
                message,
            });
        }
        Ok(envelope)
    }

    /// Search `jurisdiction` for `keyword`, keeping hits at or above the relevance threshold.
    pub async fn try_search(
        &self,
        jurisdiction: &str,
        keyword: &str,
    ) -> Result<Vec<SearchHit>, ApiError> {
        info!(jurisdiction, keyword, "searching");
        let envelope = self
            .call(&[("op", "getSearchRaw"), ("state", jurisdiction), ("query", keyword)])
            .await?;
        let results = envelope.searchresult.unwrap_or_default().results;
        let total = results.len();
        let hits: Vec<SearchHit> = results
            .into_iter()
            .map(RawHit::into_hit)
            .filter(SearchHit::is_relevant)
            .collect();
        debug!(total, relevant = hits.len(), "search results");
        Ok(hits)
    }

    /// Fetch the full record for `record_id`.
    pub async fn try_fetch(&self, record_id: &str) -> Result<BillRecord, ApiError> {
        let envelope = self.call(&[("op", "getBill"), ("id", record_id)]).await?;
        Ok(serde_json::from_value(envelope.bill.unwrap_or(Value::Null))?)
    }
}

#[async_trait]
impl BillSource for LegiScanClient {
    async fn search(&self, jurisdiction: &str, keyword: &str) -> Vec<SearchHit> {
        match self.try_search(jurisdiction, keyword).await {
            Ok(hits) => hits,
            Err(ApiError::Status { status, message }) => {
                warn!(jurisdiction, keyword, %status, %message, "getSearchRaw status not OK");
                Vec::new()
            }
            Err(e) => {
                error!(jurisdiction, keyword, error = %e, "error fetching search results");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, record_id: &str) -> Option<BillRecord> {
        match self.try_fetch(record_id).await {
            Ok(bill) => Some(bill),
            Err(ApiError::Status { status, message }) => {
                warn!(record_id, %status, %message, "getBill status not OK");
                None
            }
            Err(e) => {
                error!(record_id, error = %e, "error fetching bill");
                None
            }
        }
    }
}
