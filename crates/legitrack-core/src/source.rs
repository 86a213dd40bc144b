//! The remote bill source consumed by the scan orchestrator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bill::BillRecord;

/// Minimum search relevance (0-100) for a hit to be considered. Inclusive.
pub const RELEVANCE_THRESHOLD: u32 = 55;

/// One search result. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub record_id: String,
    pub fingerprint: String,
    pub relevance: u32,
}

impl SearchHit {
    pub fn is_relevant(&self) -> bool {
        self.relevance >= RELEVANCE_THRESHOLD
    }
}

/// Search and detail lookups against a legislative API.
///
/// Both operations fail soft: implementations log transport or API errors
/// and return an empty result instead of raising.
#[async_trait]
pub trait BillSource: Send + Sync {
    /// Hits for `keyword` in `jurisdiction`, already filtered by [`RELEVANCE_THRESHOLD`].
    async fn search(&self, jurisdiction: &str, keyword: &str) -> Vec<SearchHit>;

    /// Full record for `record_id`, or `None` if it could not be retrieved.
    async fn fetch(&self, record_id: &str) -> Option<BillRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(relevance: u32) -> SearchHit {
        SearchHit {
            record_id: "1".into(),
            fingerprint: "h".into(),
            relevance,
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(!hit(54).is_relevant());
        assert!(hit(55).is_relevant());
        assert!(hit(100).is_relevant());
    }
}
