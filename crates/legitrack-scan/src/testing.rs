//! In-memory [`BillSource`] for orchestrator tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use legitrack_core::{BillRecord, BillSource, SearchHit};
use serde_json::{Value, json};

#[derive(Default)]
pub(crate) struct FakeSource {
    hits: Mutex<HashMap<(String, String), Vec<SearchHit>>>,
    bills: Mutex<HashMap<String, Value>>,
    searches: Mutex<Vec<(String, String)>>,
    fetches: Mutex<Vec<String>>,
    search_delay: Option<Duration>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stalling(delay: Duration) -> Self {
        Self {
            search_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Register a search hit and a matching bill whose title is `title`.
    pub fn hit(&self, state: &str, keyword: &str, id: &str, hash: &str, relevance: u32) {
        self.hits
            .lock()
            .unwrap()
            .entry((state.to_string(), keyword.to_string()))
            .or_default()
            .push(SearchHit {
                record_id: id.to_string(),
                fingerprint: hash.to_string(),
                relevance,
            });
        self.bills.lock().unwrap().entry(id.to_string()).or_insert_with(|| {
            json!({
                "bill_id": id,
                "bill_number": format!("AB{id}"),
                "title": format!("Bill {id}"),
                "history": [{"date": "2025-01-10", "action": "Introduced", "chamber": "A"}]
            })
        });
    }

    /// Change the fingerprint of every registered hit for `id`.
    pub fn rehash(&self, id: &str, hash: &str) {
        for hits in self.hits.lock().unwrap().values_mut() {
            for h in hits.iter_mut().filter(|h| h.record_id == id) {
                h.fingerprint = hash.to_string();
            }
        }
    }

    /// Make `fetch(id)` fail.
    pub fn break_bill(&self, id: &str) {
        self.bills.lock().unwrap().remove(id);
    }

    pub fn searches(&self) -> Vec<(String, String)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl BillSource for FakeSource {
    async fn search(&self, jurisdiction: &str, keyword: &str) -> Vec<SearchHit> {
        self.searches
            .lock()
            .unwrap()
            .push((jurisdiction.to_string(), keyword.to_string()));
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        self.hits
            .lock()
            .unwrap()
            .get(&(jurisdiction.to_string(), keyword.to_string()))
            .map(|hits| hits.iter().filter(|h| h.is_relevant()).cloned().collect())
            .unwrap_or_default()
    }

    async fn fetch(&self, record_id: &str) -> Option<BillRecord> {
        self.fetches.lock().unwrap().push(record_id.to_string());
        let value = self.bills.lock().unwrap().get(record_id).cloned()?;
        Some(serde_json::from_value(value).unwrap())
    }
}
