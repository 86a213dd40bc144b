//! Bill records as returned by LegiScan's `getBill` operation.
//!
//! The API is loosely typed: ids arrive as numbers or strings, optional lists
//! are sometimes `null`, and the committee fields change shape between
//! records. Every field here decodes leniently so that a single odd payload
//! never rejects the whole record.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;

/// A full bill record. Fields the flattener does not use are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BillRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub bill_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub bill_number: String,
    #[serde(deserialize_with = "lenient_struct")]
    pub session: Session,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    /// LegiScan status code (`1` = introduced, ... `10` = dead).
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status_date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_action: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_action_date: String,
    pub committee: NamedField,
    pub committees: NamedField,
    #[serde(deserialize_with = "lenient_vec")]
    pub sponsors: Vec<NamedItem>,
    #[serde(deserialize_with = "lenient_vec")]
    pub history: Vec<HistoryEntry>,
    #[serde(deserialize_with = "lenient_vec")]
    pub referrals: Vec<Referral>,
    #[serde(deserialize_with = "lenient_vec")]
    pub subjects: Vec<NamedItem>,
    #[serde(deserialize_with = "lenient_vec")]
    pub votes: Vec<Vote>,
    #[serde(deserialize_with = "lenient_vec")]
    pub calendar: Vec<CalendarEvent>,
    #[serde(deserialize_with = "lenient_vec")]
    pub amendments: Vec<Amendment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Session {
    #[serde(deserialize_with = "lenient_string")]
    pub session_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub action: String,
    #[serde(deserialize_with = "lenient_string")]
    pub chamber: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Referral {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub chamber: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Vote {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub desc: String,
    #[serde(deserialize_with = "lenient_string")]
    pub motion: String,
    #[serde(deserialize_with = "lenient_string")]
    pub yea: String,
    #[serde(deserialize_with = "lenient_string")]
    pub nay: String,
    #[serde(deserialize_with = "lenient_string")]
    pub absent: String,
}

impl Vote {
    /// `motion` when present, otherwise LegiScan's `desc`.
    pub fn label(&self) -> &str {
        if self.motion.is_empty() {
            &self.desc
        } else {
            &self.motion
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarEvent {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(deserialize_with = "lenient_string")]
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Amendment {
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
}

/// A field that may be absent, a single name-bearing value, or a list of them.
///
/// `committee` is an object for bills sitting in committee and an empty list
/// otherwise; `committees` mixes plain strings, `{name}` objects and
/// `{committee: {name}}` wrappers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NamedField {
    #[default]
    Absent,
    One(NamedItem),
    Many(Vec<NamedItem>),
}

impl NamedField {
    /// Canonical rendering: non-empty names joined with `", "`.
    pub fn joined(&self) -> String {
        match self {
            NamedField::Absent => String::new(),
            NamedField::One(item) => item.name().to_string(),
            NamedField::Many(items) => join_names(items, ", "),
        }
    }
}

impl<'de> Deserialize<'de> for NamedField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => NamedField::Absent,
            Value::Array(items) => NamedField::Many(items.into_iter().map(NamedItem::from).collect()),
            other => NamedField::One(NamedItem::from(other)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamedItem {
    Text(String),
    /// `{committee: {...}}`
    Wrapped(Box<NamedItem>),
    /// `{name}` or `{subject_name}`
    Object { name: String },
    Other,
}

impl NamedItem {
    pub fn name(&self) -> &str {
        match self {
            NamedItem::Text(s) => s,
            NamedItem::Wrapped(inner) => inner.name(),
            NamedItem::Object { name } => name,
            NamedItem::Other => "",
        }
    }
}

impl From<Value> for NamedItem {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => NamedItem::Text(s),
            Value::Object(mut map) => {
                if let Some(inner) = map.remove("committee").filter(Value::is_object) {
                    return NamedItem::Wrapped(Box::new(NamedItem::from(inner)));
                }
                let name = map
                    .remove("name")
                    .or_else(|| map.remove("subject_name"))
                    .and_then(scalar_to_string)
                    .unwrap_or_default();
                NamedItem::Object { name }
            }
            _ => NamedItem::Other,
        }
    }
}

impl<'de> Deserialize<'de> for NamedItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(NamedItem::from)
    }
}

/// Join the non-empty names of `items` with `sep`.
pub fn join_names(items: &[NamedItem], sep: &str) -> String {
    items
        .iter()
        .map(NamedItem::name)
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept a string, number, or bool; anything else becomes an empty string.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

/// Decode `T` if the value has the right shape, otherwise fall back to its default.
fn lenient_struct<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Accept a list of `T`; non-lists become empty and undecodable elements are dropped.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
