use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::localized::LocalizedMap;

/// The value a revision stores for a single field.
///
/// Serialized untagged, so a snapshot reads as plain JSON. On
/// deserialization a JSON string is always `Text` and an object of strings
/// is `Localized`; `Date` values only come from callers that construct them.
///
/// The diff engine never infers a field's kind from its value; the
/// document schema declares it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Localized(LocalizedMap),
    Date(DateTime<Utc>),
    Json(Value),
}

impl FieldValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn date(at: DateTime<Utc>) -> Self {
        Self::Date(at)
    }

    pub fn json(value: Value) -> Self {
        Self::Json(value)
    }

    /// `true` for JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_localized(&self) -> Option<&LocalizedMap> {
        match self {
            Self::Localized(map) => Some(map),
            _ => None,
        }
    }

    /// The value as plain JSON. Dates render as RFC 3339 strings with
    /// millisecond precision and a `Z` suffix.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Localized(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                    .collect(),
            ),
            Self::Date(at) => Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::Json(value) => value.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<LocalizedMap> for FieldValue {
    fn from(map: LocalizedMap) -> Self {
        Self::Localized(map)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Date(at)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}
