//! Shared configuration, read from a JSON file.
//!
//! ```json
//! {
//!   "api_key": "...",
//!   "data_dir": "$HOME/legiscan_storage/data",
//!   "repo_dir": "$HOME/legiscan_storage"
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.legiscan.com/";
pub const DEFAULT_CALL_DELAY_MS: u64 = 200;

/// Built-in search terms used when no keywords file exists.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "climate",
    "transportation",
    "PFAS",
    "water",
    "CEQA",
    "energy",
    "forest",
];

pub const KEYWORDS_FILE: &str = "keywords.json";
pub const CACHE_FILE: &str = "legiscan_cache.json";
pub const EXPORT_FILE: &str = "LegiScan_Enhanced_Full_Tracker.csv";
pub const TRACKED_FILE: &str = "tracked_bills.json";
pub const NOTES_FILE: &str = "bill_notes.json";
pub const TRACKED_EXPORT_FILE: &str = "Tracked_Bills_Export.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub data_dir: Option<PathBuf>,
    pub repo_dir: Option<PathBuf>,
    pub repo_url: Option<String>,
    pub base_url: Option<String>,
    pub call_delay_ms: Option<u64>,
}

impl Config {
    /// Load `path`. A missing file yields the default config; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_json(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse config JSON, expanding `$VAR` / `${VAR}` in path values.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let mut config: Config = serde_json::from_str(text)?;
        config.data_dir = config.data_dir.map(|p| expand_env(&p.to_string_lossy()).into());
        config.repo_dir = config.repo_dir.map(|p| expand_env(&p.to_string_lossy()).into());
        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms.unwrap_or(DEFAULT_CALL_DELAY_MS))
    }
}

/// Well-known file locations under one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn keywords(&self) -> PathBuf {
        self.root.join(KEYWORDS_FILE)
    }

    pub fn cache(&self) -> PathBuf {
        self.root.join(CACHE_FILE)
    }

    pub fn export(&self) -> PathBuf {
        self.root.join(EXPORT_FILE)
    }

    pub fn tracked(&self) -> PathBuf {
        self.root.join(TRACKED_FILE)
    }

    pub fn notes(&self) -> PathBuf {
        self.root.join(NOTES_FILE)
    }

    pub fn tracked_export(&self) -> PathBuf {
        self.root.join(TRACKED_EXPORT_FILE)
    }

    pub fn uploads(&self) -> PathBuf {
        self.root.join("uploads")
    }
}

/// Expand `$VAR` and `${VAR}` from the process environment. Unset variables expand to nothing.
pub fn expand_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };
        if name.is_empty() {
            out.push('$');
            rest = after;
            continue;
        }
        out.push_str(&lookup(name).unwrap_or_default());
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}
