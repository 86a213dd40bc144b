//! Row filtering for browsing the export: free-text search plus facet filters.

use crate::annotation::{BillNotes, Position, Priority, TrackedBills};
use crate::flatten::FlatRow;

/// LegiScan status codes and their labels.
pub const STATUS_LEGEND: &[(&str, &str)] = &[
    ("1", "Introduced"),
    ("2", "In Committee"),
    ("3", "Reported"),
    ("4", "Passed One Chamber"),
    ("5", "Passed Both Chambers"),
    ("6", "Signed by Governor"),
    ("7", "Vetoed"),
    ("8", "Failed"),
    ("9", "Withdrawn"),
    ("10", "Dead"),
];

/// Human label for a status code; unknown codes are returned unchanged.
pub fn status_label(code: &str) -> &str {
    STATUS_LEGEND
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Facets to filter rows by. Empty facets match everything.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    /// Case-insensitive substring over title, sponsors, description, bill number and committees.
    pub search: Option<String>,
    pub levels: Vec<String>,
    pub jurisdictions: Vec<String>,
    pub keywords: Vec<String>,
    pub statuses: Vec<String>,
    pub positions: Vec<Position>,
    pub priorities: Vec<Priority>,
    pub tracked_only: bool,
}

/// Annotation lookups a filter may consult.
#[derive(Debug, Clone, Copy)]
pub struct Annotations<'a> {
    pub tracked: &'a TrackedBills,
    pub notes: &'a BillNotes,
}

fn facet_matches(facet: &[String], value: &str) -> bool {
    facet.is_empty() || facet.iter().any(|f| f.eq_ignore_ascii_case(value))
}

impl RowFilter {
    pub fn matches_search(&self, row: &FlatRow) -> bool {
        let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        [
            &row.title,
            &row.sponsors,
            &row.description,
            &row.bill_number,
            &row.committees,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }

    pub fn matches(&self, row: &FlatRow, annotations: Annotations<'_>) -> bool {
        if !self.matches_search(row) {
            return false;
        }
        if self.tracked_only && !annotations.tracked.contains(&row.bill_number) {
            return false;
        }
        if !facet_matches(&self.levels, &row.jurisdiction_level)
            || !facet_matches(&self.jurisdictions, &row.jurisdiction_name)
            || !facet_matches(&self.keywords, &row.keyword)
        {
            return false;
        }
        if !self.statuses.is_empty()
            && !self.statuses.iter().any(|s| {
                s == &row.status_stage || s.eq_ignore_ascii_case(status_label(&row.status_stage))
            })
        {
            return false;
        }

        let note = annotations.notes.get(&row.bill_number);
        if !self.positions.is_empty() {
            let position = note.map(|n| n.position).unwrap_or_default();
            if !self.positions.contains(&position) {
                return false;
            }
        }
        if !self.priorities.is_empty() {
            let priority = note.map(|n| n.priority).unwrap_or_default();
            if !self.priorities.contains(&priority) {
                return false;
            }
        }
        true
    }

    /// Rows matching this filter, in input order.
    pub fn apply<'r>(&self, rows: &'r [FlatRow], annotations: Annotations<'_>) -> Vec<&'r FlatRow> {
        rows.iter().filter(|r| self.matches(r, annotations)).collect()
    }
}
