//! The scan loop itself. No file I/O: the cache goes in and comes back out.

use std::time::Duration;

use chrono::Local;
use legitrack_core::config::DEFAULT_CALL_DELAY_MS;
use legitrack_core::{BillSource, ChangeCache, FlatRow, expand_tokens, flatten};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Pause after every search and every successful fetch.
    pub call_delay: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            call_delay: Duration::from_millis(DEFAULT_CALL_DELAY_MS),
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// (jurisdiction, keyword) pairs searched.
    pub pairs: usize,
    /// Relevant hits returned across all searches.
    pub hits: usize,
    /// Hits skipped because the fingerprint matched the cache.
    pub unchanged: usize,
    pub fetched: usize,
    pub fetch_failures: usize,
}

pub struct ScanOutcome {
    pub rows: Vec<FlatRow>,
    pub cache: ChangeCache,
    pub stats: ScanStats,
}

/// Search every (jurisdiction, keyword) pair and fetch the hits whose
/// fingerprint differs from `cache`.
///
/// `tokens` are postal codes or `US`; an empty list or `ALL` means every
/// jurisdiction. Each fetched bill yields one row for the keyword that found
/// it, and its cache entry is updated at once, so a later keyword that finds
/// the same unchanged bill skips it. Failed fetches leave the cache alone.
pub async fn run_scan<S>(
    source: &S,
    tokens: &[String],
    keywords: &[String],
    mut cache: ChangeCache,
    options: &ScanOptions,
) -> ScanOutcome
where
    S: BillSource + ?Sized,
{
    let jurisdictions = expand_tokens(tokens);
    let mut rows = Vec::new();
    let mut stats = ScanStats::default();
    info!(
        jurisdictions = jurisdictions.len(),
        keywords = keywords.len(),
        cached = cache.len(),
        "starting scan"
    );

    for token in &jurisdictions {
        for keyword in keywords {
            let hits = source.search(token, keyword).await;
            stats.pairs += 1;
            stats.hits += hits.len();
            pause(options).await;

            for hit in hits {
                if !cache.is_changed(&hit.record_id, &hit.fingerprint) {
                    debug!(bill_id = %hit.record_id, "unchanged, skipping");
                    stats.unchanged += 1;
                    continue;
                }

                let Some(bill) = source.fetch(&hit.record_id).await else {
                    stats.fetch_failures += 1;
                    continue;
                };
                rows.push(flatten(&bill, token, keyword));
                cache.record(
                    &hit.record_id,
                    &hit.fingerprint,
                    Local::now().naive_local(),
                );
                stats.fetched += 1;
                pause(options).await;
            }
        }
    }

    info!(
        pairs = stats.pairs,
        hits = stats.hits,
        unchanged = stats.unchanged,
        fetched = stats.fetched,
        failures = stats.fetch_failures,
        "scan finished"
    );
    ScanOutcome { rows, cache, stats }
}

async fn pause(options: &ScanOptions) {
    if !options.call_delay.is_zero() {
        tokio::time::sleep(options.call_delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;
    use legitrack_core::jurisdiction::STATES;

    fn no_delay() -> ScanOptions {
        ScanOptions {
            call_delay: Duration::ZERO,
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn second_run_without_changes_is_empty() {
        let source = FakeSource::new();
        source.hit("CA", "water", "1", "h1", 80);
        source.hit("CA", "water", "2", "h2", 60);
        let tokens = strings(&["CA"]);
        let keywords = strings(&["water"]);

        let first = run_scan(&source, &tokens, &keywords, ChangeCache::new(), &no_delay()).await;
        assert_eq!(first.rows.len(), 2);
        assert_eq!(first.cache.len(), 2);

        let second = run_scan(&source, &tokens, &keywords, first.cache.clone(), &no_delay()).await;
        assert!(second.rows.is_empty());
        assert_eq!(second.cache, first.cache);
        assert_eq!(second.stats.unchanged, 2);
        assert_eq!(source.fetches().len(), 2);
    }

    #[tokio::test]
    async fn changed_fingerprint_yields_one_row() {
        let source = FakeSource::new();
        source.hit("CA", "water", "1", "h1", 80);
        source.hit("CA", "water", "2", "h2", 80);
        let tokens = strings(&["CA"]);
        let keywords = strings(&["water"]);
        let first = run_scan(&source, &tokens, &keywords, ChangeCache::new(), &no_delay()).await;

        source.rehash("2", "h2-new");
        let second = run_scan(&source, &tokens, &keywords, first.cache, &no_delay()).await;
        assert_eq!(second.rows.len(), 1);
        assert_eq!(second.rows[0].bill_id, "2");
        assert_eq!(second.cache.get_fingerprint("2"), Some("h2-new"));
        assert_eq!(second.cache.get_fingerprint("1"), Some("h1"));
    }

    #[tokio::test]
    async fn same_bill_under_two_keywords_is_fetched_once() {
        let source = FakeSource::new();
        source.hit("CA", "water", "1", "h1", 80);
        source.hit("CA", "climate", "1", "h1", 80);
        let out = run_scan(
            &source,
            &strings(&["CA"]),
            &strings(&["water", "climate"]),
            ChangeCache::new(),
            &no_delay(),
        )
        .await;
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].keyword, "water");
        assert_eq!(source.fetches(), vec!["1"]);
    }

    #[tokio::test]
    async fn empty_search_does_not_stop_the_run() {
        let source = FakeSource::new();
        source.hit("CA", "energy", "5", "h5", 90);
        let out = run_scan(
            &source,
            &strings(&["TX", "CA"]),
            &strings(&["energy"]),
            ChangeCache::new(),
            &no_delay(),
        )
        .await;
        assert_eq!(source.searches().len(), 2);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].jurisdiction_name, "California");
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cache_untouched() {
        let source = FakeSource::new();
        source.hit("CA", "water", "1", "h1", 80);
        source.hit("CA", "water", "2", "h2", 80);
        source.break_bill("1");

        let out = run_scan(
            &source,
            &strings(&["CA"]),
            &strings(&["water"]),
            ChangeCache::new(),
            &no_delay(),
        )
        .await;
        assert_eq!(out.rows.len(), 1);
        assert!(out.cache.get("1").is_none());
        assert_eq!(out.cache.get_fingerprint("2"), Some("h2"));
        assert_eq!(out.stats.fetch_failures, 1);
    }

    #[tokio::test]
    async fn low_relevance_is_never_fetched() {
        let source = FakeSource::new();
        source.hit("CA", "water", "1", "h1", 54);
        source.hit("CA", "water", "2", "h2", 55);
        let out = run_scan(
            &source,
            &strings(&["CA"]),
            &strings(&["water"]),
            ChangeCache::new(),
            &no_delay(),
        )
        .await;
        assert_eq!(source.fetches(), vec!["2"]);
        assert_eq!(out.stats.hits, 1);
    }

    #[tokio::test]
    async fn all_expands_to_every_jurisdiction() {
        let source = FakeSource::new();
        let out = run_scan(
            &source,
            &strings(&["all"]),
            &strings(&["water"]),
            ChangeCache::new(),
            &no_delay(),
        )
        .await;
        assert_eq!(out.stats.pairs, STATES.len() + 1);
        assert!(source.searches().iter().any(|(j, _)| j == "US"));

        let source = FakeSource::new();
        run_scan(&source, &[], &strings(&["water"]), ChangeCache::new(), &no_delay()).await;
        assert_eq!(source.searches().len(), STATES.len() + 1);
    }

    #[tokio::test]
    async fn federal_rows_are_labelled() {
        let source = FakeSource::new();
        source.hit("US", "PFAS", "9", "h9", 70);
        let out = run_scan(
            &source,
            &strings(&["us"]),
            &strings(&["PFAS"]),
            ChangeCache::new(),
            &no_delay(),
        )
        .await;
        assert_eq!(out.rows[0].jurisdiction_level, "Federal");
        assert_eq!(out.rows[0].jurisdiction_name, "U.S. Congress");
    }

    #[tokio::test]
    async fn legiscan_status_error_skips_only_that_pair() {
        use legitrack_sync::LegiScanClient;
        use serde_json::json;
        use wiremock::matchers::{method, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("op", "getSearchRaw"))
            .and(query_param("state", "TX"))
            .and(query_param("query", "energy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"status": "ERROR", "alert": {"message": "Unknown state"}}),
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("op", "getSearchRaw"))
            .and(query_param("state", "CA"))
            .and(query_param("query", "energy"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "searchresult": {
                    "summary": {"count": 1},
                    "results": [{"bill_id": 501, "change_hash": "c501", "relevance": 88}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("op", "getBill"))
            .and(query_param("id", "501"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "bill": {
                    "bill_id": 501,
                    "bill_number": "SB100",
                    "title": "Clean energy",
                    "history": [{"date": "2025-03-01", "action": "Introduced", "chamber": "S"}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = LegiScanClient::with_timeout(
            format!("{}/", server.uri()),
            "test-key",
            Duration::from_secs(5),
        )
        .unwrap();
        let out = run_scan(
            &client,
            &strings(&["TX", "CA"]),
            &strings(&["energy"]),
            ChangeCache::new(),
            &no_delay(),
        )
        .await;

        assert_eq!(out.stats.pairs, 2);
        assert_eq!(out.stats.fetched, 1);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].bill_number, "SB100");
        assert_eq!(out.rows[0].jurisdiction_name, "California");
        assert!(out.cache.get("501").is_some());
    }
}
