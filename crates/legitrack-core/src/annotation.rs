//! User annotations on bills: the tracked list and per-bill notes.
//!
//! Both are keyed by bill number (e.g. `AB1207`), not LegiScan id, because
//! that is what users type and what survives re-scans.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[default]
    #[serde(rename = "")]
    Unassigned,
    Support,
    Oppose,
    Watch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    #[serde(rename = "")]
    Unassigned,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}' (expected one of: {expected})")]
pub struct ParseLabelError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Unassigned => "",
            Position::Support => "Support",
            Position::Oppose => "Oppose",
            Position::Watch => "Watch",
        }
    }
}

impl FromStr for Position {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Position::Unassigned),
            "support" => Ok(Position::Support),
            "oppose" => Ok(Position::Oppose),
            "watch" => Ok(Position::Watch),
            _ => Err(ParseLabelError {
                kind: "position",
                value: s.to_string(),
                expected: "support, oppose, watch, none",
            }),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Unassigned => "",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Priority::Unassigned),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParseLabelError {
                kind: "priority",
                value: s.to_string(),
                expected: "high, medium, low, none",
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form notes attached to one bill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillNote {
    pub comment: String,
    pub links: Vec<String>,
    /// Paths of attached documents.
    pub files: Vec<String>,
    pub position: Position,
    pub priority: Priority,
}

impl BillNote {
    /// File names of the attachments, without directories.
    pub fn file_names(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(|f| f.rsplit(['/', '\\']).next().unwrap_or(f.as_str()))
            .collect()
    }
}

/// Bill number → [`BillNote`].
pub type BillNotes = BTreeMap<String, BillNote>;

/// Ordered, duplicate-free list of tracked bill numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedBills(Vec<String>);

impl TrackedBills {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, bill_number: &str) -> bool {
        self.0.iter().any(|b| b == bill_number)
    }

    /// Track `bill_number`. Returns false if it was already tracked.
    pub fn track(&mut self, bill_number: &str) -> bool {
        if self.contains(bill_number) {
            return false;
        }
        self.0.push(bill_number.to_string());
        true
    }

    /// Stop tracking `bill_number`. Returns false if it was not tracked.
    pub fn untrack(&mut self, bill_number: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|b| b != bill_number);
        self.0.len() != before
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_reads_legacy_json() {
        let json = r#"{
            "AB1207": {"comment": "Watch amendments", "links": ["https://example.org/a"],
                       "files": ["/data/uploads/AB1207_memo.pdf"], "position": "Support", "priority": ""}
        }"#;
        let notes: BillNotes = serde_json::from_str(json).unwrap();
        let note = &notes["AB1207"];
        assert_eq!(note.position, Position::Support);
        assert_eq!(note.priority, Priority::Unassigned);
        assert_eq!(note.file_names(), vec!["AB1207_memo.pdf"]);
    }

    #[test]
    fn note_missing_fields_default() {
        let note: BillNote = serde_json::from_str(r#"{"comment": "hi"}"#).unwrap();
        assert_eq!(note.position, Position::Unassigned);
        assert!(note.links.is_empty());
    }

    #[test]
    fn unassigned_serialises_as_empty_string() {
        let json = serde_json::to_string(&BillNote::default()).unwrap();
        assert!(json.contains(r#""position":"""#));
        assert!(json.contains(r#""priority":"""#));
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!("oppose".parse::<Position>().unwrap(), Position::Oppose);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("none".parse::<Priority>().unwrap(), Priority::Unassigned);
        assert!("maybe".parse::<Position>().is_err());
    }

    #[test]
    fn tracking_is_idempotent() {
        let mut tracked = TrackedBills::new();
        assert!(tracked.track("AB1207"));
        assert!(!tracked.track("AB1207"));
        assert!(tracked.track("SB44"));
        assert_eq!(tracked.iter().collect::<Vec<_>>(), vec!["AB1207", "SB44"]);
        assert!(tracked.untrack("AB1207"));
        assert!(!tracked.untrack("AB1207"));
        assert_eq!(tracked.len(), 1);
    }
}
