//! Jurisdiction tokens: two-letter postal codes plus the federal alias.

/// Token that selects every known jurisdiction.
pub const ALL_ALIAS: &str = "ALL";

/// Token for the U.S. Congress.
pub const FEDERAL_ALIAS: &str = "US";

pub const FEDERAL_NAME: &str = "U.S. Congress";

/// Postal code → jurisdiction name, in scan order.
pub const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
    ("PR", "Puerto Rico"),
    ("VI", "Virgin Islands"),
    ("GU", "Guam"),
    ("AS", "American Samoa"),
    ("MP", "Northern Mariana Islands"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Federal,
    State,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Federal => "Federal",
            Level::State => "State",
        }
    }
}

/// Resolved jurisdiction metadata for a scan token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jurisdiction {
    pub level: Level,
    pub name: String,
}

impl Jurisdiction {
    /// Resolve a token. Unknown codes are treated as states and keep the token as their name.
    pub fn from_token(token: &str) -> Self {
        if token == FEDERAL_ALIAS {
            return Self {
                level: Level::Federal,
                name: FEDERAL_NAME.to_string(),
            };
        }
        let name = state_name(token).unwrap_or(token);
        Self {
            level: Level::State,
            name: name.to_string(),
        }
    }
}

/// Level and name labels for a bill number alone, for rows saved without
/// jurisdiction columns.
///
/// Returns `("Unknown", "Unknown")` when nothing matches.
pub fn guess_from_bill_number(bill_number: &str) -> (&'static str, &'static str) {
    const UNKNOWN: (&str, &str) = ("Unknown", "Unknown");
    let number = bill_number.trim().to_ascii_uppercase();
    if number.is_empty() {
        return UNKNOWN;
    }

    if let Some((code, _)) = number.split_once('-')
        && let Some(name) = state_name(code)
    {
        return (Level::State.as_str(), name);
    }

    const FEDERAL_PREFIXES: [&str; 6] = ["H.R.", "HR", "HJ", "HC", "S.", "SJ"];
    if FEDERAL_PREFIXES.iter().any(|p| number.starts_with(p)) {
        return (Level::Federal.as_str(), FEDERAL_NAME);
    }

    const CALIFORNIA_PREFIXES: [&str; 3] = ["AB", "ACR", "SCR"];
    if CALIFORNIA_PREFIXES.iter().any(|p| number.starts_with(p)) {
        return (Level::State.as_str(), "California");
    }
    if number.starts_with("HB") || number.starts_with("SB") {
        return (Level::State.as_str(), "Various States");
    }
    UNKNOWN
}

pub fn state_name(code: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Normalise CLI tokens into the list of jurisdictions to scan.
///
/// Tokens are upper-cased and de-duplicated in order. An empty list, or one
/// containing [`ALL_ALIAS`], expands to every state code followed by [`FEDERAL_ALIAS`].
pub fn expand_tokens<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let upper: Vec<String> = tokens
        .iter()
        .map(|t| t.as_ref().trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    if upper.is_empty() || upper.iter().any(|t| t == ALL_ALIAS) {
        return STATES
            .iter()
            .map(|(code, _)| code.to_string())
            .chain(std::iter::once(FEDERAL_ALIAS.to_string()))
            .collect();
    }

    let mut out: Vec<String> = Vec::with_capacity(upper.len());
    for token in upper {
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn california_is_a_state() {
        let j = Jurisdiction::from_token("CA");
        assert_eq!(j.level, Level::State);
        assert_eq!(j.name, "California");
    }

    #[test]
    fn us_is_congress() {
        let j = Jurisdiction::from_token("US");
        assert_eq!(j.level, Level::Federal);
        assert_eq!(j.name, "U.S. Congress");
        assert_eq!(j.level.as_str(), "Federal");
    }

    #[test]
    fn unknown_code_passes_through() {
        let j = Jurisdiction::from_token("ZZ");
        assert_eq!(j.level, Level::State);
        assert_eq!(j.name, "ZZ");
    }

    #[test]
    fn bill_number_guesses() {
        assert_eq!(guess_from_bill_number("tx-hb12"), ("State", "Texas"));
        assert_eq!(guess_from_bill_number("HR1234"), ("Federal", "U.S. Congress"));
        assert_eq!(guess_from_bill_number("S.100"), ("Federal", "U.S. Congress"));
        assert_eq!(guess_from_bill_number("AB1207"), ("State", "California"));
        assert_eq!(guess_from_bill_number("SCR5"), ("State", "California"));
        assert_eq!(guess_from_bill_number("SB5"), ("State", "Various States"));
        assert_eq!(guess_from_bill_number("LB77"), ("Unknown", "Unknown"));
        assert_eq!(guess_from_bill_number("  "), ("Unknown", "Unknown"));
    }

    #[test]
    fn all_expands_to_states_plus_federal() {
        let expanded = expand_tokens(&["ca", "all"]);
        assert_eq!(expanded.len(), STATES.len() + 1);
        assert_eq!(expanded.first().map(String::as_str), Some("AL"));
        assert_eq!(expanded.last().map(String::as_str), Some("US"));
    }

    #[test]
    fn empty_defaults_to_all() {
        let none: [&str; 0] = [];
        assert_eq!(expand_tokens(&none).len(), STATES.len() + 1);
    }

    #[test]
    fn explicit_tokens_are_uppercased_and_deduped() {
        assert_eq!(expand_tokens(&["tx", "US", "TX"]), vec!["TX", "US"]);
    }
}
