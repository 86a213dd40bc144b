//! On-disk scan: keywords and cache in, export and cache out.

use std::path::PathBuf;
use std::time::Duration;

use legitrack_core::{BillSource, DataPaths};
use legitrack_store::{CacheFile, KeywordsFile, StoreError, TrackerExport};
use thiserror::Error;
use tracing::{info, warn};

use crate::run::{ScanOptions, ScanStats, run_scan};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("scan timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    NotRun,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub new_rows: usize,
    /// Rows in the export after the merge; `None` when it was not rewritten.
    pub export_rows: Option<usize>,
    pub stats: ScanStats,
}

/// Runs scans against the files under one data directory.
pub struct Scanner<S> {
    source: S,
    paths: DataPaths,
    keywords_file: Option<PathBuf>,
    options: ScanOptions,
    state: ScanState,
}

impl<S: BillSource> Scanner<S> {
    pub fn new(source: S, paths: DataPaths) -> Self {
        Self {
            source,
            paths,
            keywords_file: None,
            options: ScanOptions::default(),
            state: ScanState::NotRun,
        }
    }

    /// Read keywords from `path`; a missing file then fails the run.
    pub fn with_keywords_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.keywords_file = Some(path.into());
        self
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    fn load_keywords(&self) -> Result<Vec<String>, StoreError> {
        match &self.keywords_file {
            Some(path) => KeywordsFile::new(path).load(),
            None => KeywordsFile::new(self.paths.keywords()).load_or_default(),
        }
    }

    /// Run one scan over `tokens` and persist the results.
    pub async fn run(&mut self, tokens: &[String]) -> Result<ScanReport, ScanError> {
        self.state = ScanState::Running;
        match self.run_inner(tokens).await {
            Ok(report) => {
                self.state = ScanState::Completed;
                Ok(report)
            }
            Err(e) => {
                self.state = ScanState::Aborted;
                Err(e)
            }
        }
    }

    async fn run_inner(&self, tokens: &[String]) -> Result<ScanReport, ScanError> {
        // 1. Inputs.
        let keywords = self.load_keywords()?;
        let cache_file = CacheFile::new(self.paths.cache());
        let cache = cache_file.load()?;

        // 2. Search and fetch.
        let outcome = run_scan(&self.source, tokens, &keywords, cache, &self.options).await;

        // 3. Persist. Nothing below awaits, so a timeout never lands mid-write.
        let new_rows = outcome.rows.len();
        let export_rows = if new_rows > 0 {
            let export = TrackerExport::new(self.paths.export());
            Some(export.merge(&outcome.rows)?)
        } else {
            info!("no new or changed bills");
            None
        };
        cache_file.save(&outcome.cache)?;

        Ok(ScanReport {
            new_rows,
            export_rows,
            stats: outcome.stats,
        })
    }

    /// [`run`](Self::run) under a wall-clock limit. On expiry nothing is persisted.
    pub async fn run_with_timeout(
        &mut self,
        tokens: &[String],
        limit: Duration,
    ) -> Result<ScanReport, ScanError> {
        let outcome = tokio::time::timeout(limit, self.run(tokens)).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(limit = ?limit, "scan timed out");
                self.state = ScanState::Aborted;
                Err(ScanError::TimedOut(limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;

    fn scanner(source: FakeSource, dir: &std::path::Path) -> Scanner<FakeSource> {
        Scanner::new(source, DataPaths::new(dir)).with_options(ScanOptions {
            call_delay: Duration::ZERO,
        })
    }

    fn write_keywords(dir: &std::path::Path, keywords: &[&str]) {
        KeywordsFile::new(DataPaths::new(dir).keywords())
            .save(&keywords.iter().map(|k| k.to_string()).collect::<Vec<_>>())
            .unwrap();
    }

    #[tokio::test]
    async fn run_writes_export_and_cache() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_keywords(tmp.path(), &["water"]);
        let source = FakeSource::new();
        source.hit("CA", "water", "1", "h1", 80);

        let mut scanner = scanner(source, tmp.path());
        assert_eq!(scanner.state(), ScanState::NotRun);
        let report = scanner.run(&["CA".to_string()]).await.unwrap();
        assert_eq!(scanner.state(), ScanState::Completed);
        assert_eq!(report.new_rows, 1);
        assert_eq!(report.export_rows, Some(1));

        let paths = scanner.paths().clone();
        let rows = TrackerExport::new(paths.export()).read().unwrap();
        assert_eq!(rows[0].bill_number, "AB1");
        let cache = CacheFile::new(paths.cache()).load().unwrap();
        assert_eq!(cache.get_fingerprint("1"), Some("h1"));
    }

    #[tokio::test]
    async fn unchanged_second_run_leaves_export_alone() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_keywords(tmp.path(), &["water"]);
        let source = FakeSource::new();
        source.hit("CA", "water", "1", "h1", 80);
        let mut scanner = scanner(source, tmp.path());
        let tokens = vec!["CA".to_string()];

        scanner.run(&tokens).await.unwrap();
        let export_path = scanner.paths().export();
        let before = std::fs::read(&export_path).unwrap();

        let report = scanner.run(&tokens).await.unwrap();
        assert_eq!(report.new_rows, 0);
        assert_eq!(report.export_rows, None);
        assert_eq!(std::fs::read(&export_path).unwrap(), before);
    }

    #[tokio::test]
    async fn updated_bill_replaces_its_row_only() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_keywords(tmp.path(), &["water"]);
        let source = FakeSource::new();
        source.hit("CA", "water", "1", "h1", 80);
        source.hit("CA", "water", "2", "h2", 80);
        let mut scanner = scanner(source, tmp.path());
        let tokens = vec!["CA".to_string()];
        scanner.run(&tokens).await.unwrap();

        scanner.source.rehash("2", "h2b");
        let report = scanner.run(&tokens).await.unwrap();
        assert_eq!(report.new_rows, 1);
        assert_eq!(report.export_rows, Some(2));
    }

    #[tokio::test]
    async fn missing_default_keywords_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut scanner = scanner(FakeSource::new(), tmp.path());
        let report = scanner.run(&["CA".to_string()]).await.unwrap();
        assert_eq!(report.stats.pairs, 7);
    }

    #[tokio::test]
    async fn missing_explicit_keywords_file_aborts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut scanner =
            scanner(FakeSource::new(), tmp.path()).with_keywords_file(tmp.path().join("kw.json"));
        let err = scanner.run(&["CA".to_string()]).await.unwrap_err();
        assert!(matches!(
            err,
            ScanError::Store(StoreError::KeywordsNotFound(_))
        ));
        assert_eq!(scanner.state(), ScanState::Aborted);
        assert!(!scanner.paths().cache().exists());
    }

    #[tokio::test]
    async fn unwritable_cache_aborts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("data");
        std::fs::write(&blocker, "not a directory").unwrap();
        let keywords = tmp.path().join("keywords.json");
        std::fs::write(&keywords, "[\"water\"]").unwrap();

        let mut scanner = scanner(FakeSource::new(), &blocker).with_keywords_file(&keywords);
        assert!(scanner.run(&["CA".to_string()]).await.is_err());
        assert_eq!(scanner.state(), ScanState::Aborted);
    }

    #[tokio::test]
    async fn timeout_persists_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_keywords(tmp.path(), &["water"]);
        let source = FakeSource::stalling(Duration::from_secs(60));
        source.hit("CA", "water", "1", "h1", 80);
        let mut scanner = scanner(source, tmp.path());

        let err = scanner
            .run_with_timeout(&["CA".to_string()], Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::TimedOut(_)));
        assert_eq!(scanner.state(), ScanState::Aborted);
        assert!(!scanner.paths().cache().exists());
        assert!(!scanner.paths().export().exists());
    }
}
