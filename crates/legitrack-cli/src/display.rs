//! Text rendering for tracker rows: one-line listings and vertical bill cards.

use legitrack_core::filter::status_label;
use legitrack_core::flatten::COLUMNS;
use legitrack_core::{BillNote, FlatRow};

const MAX_LIST_ITEMS: usize = 10;
const TITLE_WIDTH: usize = 60;

// ── Card section groupings ──

const IDENTITY: &[&str] = &[
    "bill_id",
    "session",
    "jurisdiction_level",
    "jurisdiction_name",
    "keyword",
    "url",
];

const STATUS: &[&str] = &[
    "status_stage",
    "status_date",
    "last_action",
    "last_action_date",
];

const PEOPLE: &[&str] = &["sponsors", "committee", "committees", "subjects"];

const MILESTONES: &[&str] = &[
    "introduced_date",
    "committee_date",
    "passed_assembly_date",
    "passed_senate_date",
    "governor_action_date",
];

const ACTIVITY: &[&str] = &["history", "referrals", "votes", "calendar", "amendments"];

// ── Public API ──

/// One line per row: number, jurisdiction, status, truncated title.
pub fn print_row_line(row: &FlatRow, tracked: bool) {
    let mark = if tracked { "*" } else { " " };
    println!(
        "{mark} {:<10} {:<16} {:<22} {}",
        row.bill_number,
        row.jurisdiction_name,
        status_label(&row.status_stage),
        truncate(&row.title, TITLE_WIDTH)
    );
}

/// Print a row as a vertical card grouped by section, followed by its note.
pub fn print_bill_card(row: &FlatRow, note: Option<&BillNote>, tracked: bool) {
    println!("=== {} ===", row.bill_number);
    if !row.title.is_empty() {
        println!("{}", row.title);
    }
    if !row.description.is_empty() && row.description != row.title {
        println!("{}", row.description);
    }
    if tracked {
        println!("(tracked)");
    }
    println!();

    print_section(row, "Identity", IDENTITY);
    print_section(row, "Status", STATUS);
    print_section(row, "Sponsors & Committees", PEOPLE);
    print_section(row, "Milestones", MILESTONES);
    print_section(row, "Activity", ACTIVITY);

    if let Some(note) = note {
        print_note(note);
    }
}

pub fn print_note(note: &BillNote) {
    println!("Notes");
    print_field("position", note.position.as_str());
    print_field("priority", note.priority.as_str());
    print_field("comment", &note.comment);
    print_field("links", &note.links.join(", "));
    print_field("files", &note.file_names().join("; "));
    println!();
}

// ── Section rendering ──

fn print_section(row: &FlatRow, header: &str, cols: &[&str]) {
    if cols.iter().all(|&col| field(row, col).is_empty()) {
        return;
    }

    println!("{header}");
    for &col in cols {
        let value = field(row, col);
        match col {
            "status_stage" => {
                print_field(col, &format!("{} ({value})", status_label(value)));
            }
            _ if ACTIVITY.contains(&col) => print_list(col, value),
            _ => print_field(col, value),
        }
    }
    println!();
}

fn print_field(name: &str, value: &str) {
    if !value.is_empty() {
        println!("  {name:<22} {value}");
    }
}

/// `"; "`-joined entries, one per line.
fn print_list(name: &str, joined: &str) {
    let items: Vec<&str> = joined.split("; ").filter(|s| !s.is_empty()).collect();
    if items.is_empty() {
        return;
    }
    println!("  {} ({}):", name, items.len());
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("    {item}");
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("    ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
}

// ── Helpers ──

fn field<'a>(row: &'a FlatRow, name: &str) -> &'a str {
    COLUMNS
        .iter()
        .position(|c| *c == name)
        .map(|i| row.values()[i])
        .unwrap_or("")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_card_column_exists() {
        for col in [IDENTITY, STATUS, PEOPLE, MILESTONES, ACTIVITY].concat() {
            assert!(COLUMNS.contains(&col), "{col}");
        }
    }

    #[test]
    fn field_reads_by_name() {
        let row = FlatRow {
            committees: "Natural Resources".into(),
            ..FlatRow::default()
        };
        assert_eq!(field(&row, "committees"), "Natural Resources");
        assert_eq!(field(&row, "no_such_column"), "");
    }

    #[test]
    fn truncate_is_char_aware() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }
}
