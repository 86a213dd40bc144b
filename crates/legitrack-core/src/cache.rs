//! Change cache: last-seen fingerprint per bill.
//!
//! This is plain data. Loading and saving the JSON file lives in
//! `legitrack-store`; the orchestrator takes a cache by value and returns the
//! updated one.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Last-seen state of one bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// LegiScan `change_hash` at the time of the last successful fetch.
    pub change_hash: String,
    /// Local wall-clock time of that fetch.
    pub last_checked: NaiveDateTime,
}

/// Bill id → [`CacheEntry`]. Serialises as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl ChangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, record_id: &str) -> Option<&CacheEntry> {
        self.entries.get(record_id)
    }

    pub fn get_fingerprint(&self, record_id: &str) -> Option<&str> {
        self.entries.get(record_id).map(|e| e.change_hash.as_str())
    }

    /// True when `fingerprint` differs from the cached one or the record is unseen.
    pub fn is_changed(&self, record_id: &str, fingerprint: &str) -> bool {
        self.get_fingerprint(record_id) != Some(fingerprint)
    }

    /// Insert or overwrite the entry for `record_id`.
    pub fn record(&mut self, record_id: &str, fingerprint: &str, checked_at: NaiveDateTime) {
        self.entries.insert(
            record_id.to_string(),
            CacheEntry {
                change_hash: fingerprint.to_string(),
                last_checked: checked_at,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
