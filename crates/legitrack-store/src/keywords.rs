//! The keywords file: a JSON array of search terms.

use std::path::{Path, PathBuf};

use legitrack_core::config::DEFAULT_KEYWORDS;
use tracing::info;

use crate::StoreError;
use crate::fsutil::{read_json, write_json};

#[derive(Debug, Clone)]
pub struct KeywordsFile {
    path: PathBuf,
}

impl KeywordsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load keywords; a missing file is an error.
    pub fn load(&self) -> Result<Vec<String>, StoreError> {
        let keywords: Vec<String> = read_json(&self.path)?
            .ok_or_else(|| StoreError::KeywordsNotFound(self.path.clone()))?;
        info!(count = keywords.len(), "loaded keywords");
        Ok(keywords)
    }

    /// Load keywords, falling back to the built-in set when the file is missing.
    pub fn load_or_default(&self) -> Result<Vec<String>, StoreError> {
        match self.load() {
            Err(StoreError::KeywordsNotFound(_)) => {
                info!("using default keywords");
                Ok(DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect())
            }
            other => other,
        }
    }

    /// Save keywords sorted and de-duplicated. Returns the saved list.
    pub fn save(&self, keywords: &[String]) -> Result<Vec<String>, StoreError> {
        let mut sorted: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        sorted.sort();
        sorted.dedup();
        write_json(&self.path, &sorted)?;
        info!(count = sorted.len(), "saved keywords");
        Ok(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error_for_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = KeywordsFile::new(tmp.path().join("keywords.json"));
        assert!(matches!(file.load(), Err(StoreError::KeywordsNotFound(_))));
    }

    #[test]
    fn missing_file_defaults_to_seven_terms() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = KeywordsFile::new(tmp.path().join("keywords.json"));
        let keywords = file.load_or_default().unwrap();
        assert_eq!(keywords.len(), 7);
        assert_eq!(keywords[0], "climate");
        assert!(keywords.contains(&"CEQA".to_string()));
    }

    #[test]
    fn save_sorts_and_dedups() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = KeywordsFile::new(tmp.path().join("keywords.json"));
        let saved = file
            .save(&["water".into(), "PFAS".into(), "water".into(), " ".into()])
            .unwrap();
        assert_eq!(saved, vec!["PFAS", "water"]);
        assert_eq!(file.load().unwrap(), saved);
    }
}
