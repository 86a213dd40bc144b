//! Flattening of nested bill records into fixed-column export rows.

use serde::{Deserialize, Serialize};

use crate::bill::{BillRecord, HistoryEntry, join_names};
use crate::jurisdiction::Jurisdiction;

/// Export column names, in file order.
pub const COLUMNS: &[&str] = &[
    "jurisdiction_level",
    "jurisdiction_name",
    "bill_id",
    "session",
    "bill_number",
    "title",
    "description",
    "status_date",
    "status_stage",
    "url",
    "committee",
    "keyword",
    "sponsor_names",
    "sponsors",
    "committees",
    "referrals",
    "history",
    "last_action",
    "last_action_date",
    "subjects",
    "introduced_date",
    "committee_date",
    "passed_assembly_date",
    "passed_senate_date",
    "governor_action_date",
    "votes",
    "calendar",
    "amendments",
];

/// One bill matched by one keyword, flattened to strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRow {
    pub jurisdiction_level: String,
    pub jurisdiction_name: String,
    pub bill_id: String,
    pub session: String,
    pub bill_number: String,
    pub title: String,
    pub description: String,
    pub status_date: String,
    pub status_stage: String,
    pub url: String,
    pub committee: String,
    pub keyword: String,
    pub sponsor_names: String,
    pub sponsors: String,
    pub committees: String,
    pub referrals: String,
    pub history: String,
    pub last_action: String,
    pub last_action_date: String,
    pub subjects: String,
    pub introduced_date: String,
    pub committee_date: String,
    pub passed_assembly_date: String,
    pub passed_senate_date: String,
    pub governor_action_date: String,
    pub votes: String,
    pub calendar: String,
    pub amendments: String,
}

impl FlatRow {
    /// Values in [`COLUMNS`] order.
    pub fn values(&self) -> [&str; 28] {
        [
            self.jurisdiction_level.as_str(),
            self.jurisdiction_name.as_str(),
            self.bill_id.as_str(),
            self.session.as_str(),
            self.bill_number.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.status_date.as_str(),
            self.status_stage.as_str(),
            self.url.as_str(),
            self.committee.as_str(),
            self.keyword.as_str(),
            self.sponsor_names.as_str(),
            self.sponsors.as_str(),
            self.committees.as_str(),
            self.referrals.as_str(),
            self.history.as_str(),
            self.last_action.as_str(),
            self.last_action_date.as_str(),
            self.subjects.as_str(),
            self.introduced_date.as_str(),
            self.committee_date.as_str(),
            self.passed_assembly_date.as_str(),
            self.passed_senate_date.as_str(),
            self.governor_action_date.as_str(),
            self.votes.as_str(),
            self.calendar.as_str(),
            self.amendments.as_str(),
        ]
    }

    /// Build a row from values in [`COLUMNS`] order. Missing trailing values are empty.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut v = values.into_iter().map(Into::into);
        let mut next = || v.next().unwrap_or_default();
        Self {
            jurisdiction_level: next(),
            jurisdiction_name: next(),
            bill_id: next(),
            session: next(),
            bill_number: next(),
            title: next(),
            description: next(),
            status_date: next(),
            status_stage: next(),
            url: next(),
            committee: next(),
            keyword: next(),
            sponsor_names: next(),
            sponsors: next(),
            committees: next(),
            referrals: next(),
            history: next(),
            last_action: next(),
            last_action_date: next(),
            subjects: next(),
            introduced_date: next(),
            committee_date: next(),
            passed_assembly_date: next(),
            passed_senate_date: next(),
            governor_action_date: next(),
            votes: next(),
            calendar: next(),
            amendments: next(),
        }
    }
}

/// Milestone slots, in match-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Introduced,
    Committee,
    PassedAssembly,
    PassedSenate,
    GovernorAction,
}

impl Milestone {
    pub const ALL: [Milestone; 5] = [
        Milestone::Introduced,
        Milestone::Committee,
        Milestone::PassedAssembly,
        Milestone::PassedSenate,
        Milestone::GovernorAction,
    ];

    /// Lower-case substring an action must contain to fill this slot.
    pub fn needle(self) -> &'static str {
        match self {
            Milestone::Introduced => "introduce",
            Milestone::Committee => "committee",
            Milestone::PassedAssembly => "passed assembly",
            Milestone::PassedSenate => "passed senate",
            Milestone::GovernorAction => "governor",
        }
    }
}

/// First-match dates for each [`Milestone`]. Empty string means not reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Milestones {
    pub introduced: String,
    pub committee: String,
    pub passed_assembly: String,
    pub passed_senate: String,
    pub governor_action: String,
}

impl Milestones {
    fn slot(&mut self, m: Milestone) -> &mut String {
        match m {
            Milestone::Introduced => &mut self.introduced,
            Milestone::Committee => &mut self.committee,
            Milestone::PassedAssembly => &mut self.passed_assembly,
            Milestone::PassedSenate => &mut self.passed_senate,
            Milestone::GovernorAction => &mut self.governor_action,
        }
    }

    /// Scan history in order. Each entry fills at most one slot: the first
    /// still-empty milestone whose needle occurs in the action. Filled slots
    /// are never overwritten.
    pub fn from_history(history: &[HistoryEntry]) -> Self {
        let mut out = Self::default();
        for entry in history {
            let action = entry.action.to_lowercase();
            for m in Milestone::ALL {
                let slot = out.slot(m);
                if slot.is_empty() && action.contains(m.needle()) {
                    *slot = entry.date.clone();
                    break;
                }
            }
        }
        out
    }
}

fn chamber_name(code: &str) -> &str {
    match code {
        "A" => "Assembly",
        "S" => "Senate",
        "H" => "House",
        other => other,
    }
}

fn one_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

fn or_zero(s: &str) -> &str {
    if s.is_empty() { "0" } else { s }
}

/// Flatten a bill found in `token`'s jurisdiction by `keyword`.
///
/// Pure and infallible: missing sub-fields produce empty strings.
pub fn flatten(bill: &BillRecord, token: &str, keyword: &str) -> FlatRow {
    let jurisdiction = Jurisdiction::from_token(token);

    let sponsor_names = join_names(&bill.sponsors, ", ");
    let committee = bill.committee.joined();
    let committees = match bill.committees.joined() {
        c if c.is_empty() => committee.clone(),
        c => c,
    };

    let history: Vec<String> = bill
        .history
        .iter()
        .map(|h| {
            format!(
                "{}: {} ({})",
                chamber_name(&h.chamber),
                one_line(&h.action),
                h.date
            )
        })
        .collect();
    let last_action = history
        .last()
        .cloned()
        .unwrap_or_else(|| one_line(&bill.last_action));
    let last_action_date = if bill.last_action_date.is_empty() {
        bill.status_date.clone()
    } else {
        bill.last_action_date.clone()
    };

    let referrals = bill
        .referrals
        .iter()
        .map(|r| format!("{} - {} on {}", chamber_name(&r.chamber), r.name, r.date))
        .collect::<Vec<_>>()
        .join("; ");
    let votes = bill
        .votes
        .iter()
        .map(|v| {
            format!(
                "{} ({}): Yea {}, Nay {}, Absent {}",
                v.date,
                v.label(),
                or_zero(&v.yea),
                or_zero(&v.nay),
                or_zero(&v.absent)
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    let calendar = bill
        .calendar
        .iter()
        .map(|c| format!("{}: {} - {}", c.date, c.kind, c.location))
        .collect::<Vec<_>>()
        .join("; ");
    let amendments = bill
        .amendments
        .iter()
        .map(|a| format!("{}: {}", a.date, one_line(&a.description)))
        .collect::<Vec<_>>()
        .join("; ");

    let milestones = Milestones::from_history(&bill.history);

    FlatRow {
        jurisdiction_level: jurisdiction.level.as_str().to_string(),
        jurisdiction_name: jurisdiction.name,
        bill_id: bill.bill_id.clone(),
        session: bill.session.session_name.clone(),
        bill_number: bill.bill_number.clone(),
        title: one_line(&bill.title),
        description: one_line(&bill.description),
        status_date: bill.status_date.clone(),
        status_stage: bill.status.clone(),
        url: bill.url.clone(),
        committee,
        keyword: keyword.to_string(),
        sponsors: sponsor_names.clone(),
        sponsor_names,
        committees,
        referrals,
        history: history.join("; "),
        last_action,
        last_action_date,
        subjects: join_names(&bill.subjects, "; "),
        introduced_date: milestones.introduced,
        committee_date: milestones.committee,
        passed_assembly_date: milestones.passed_assembly,
        passed_senate_date: milestones.passed_senate,
        governor_action_date: milestones.governor_action,
        votes,
        calendar,
        amendments,
    }
}
