//! Field-level diffing.
//!
//! The caller declares each field's [`FieldKind`]; [`diff_field`] dispatches
//! on it. Each `diff_*_field` function returns `None` exactly when the two
//! inputs are equal under its own equality rule.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use folio_types::{FieldKind, FieldValue, LocalizedMap};

use crate::scalar::{normalize_scalar, ScalarValue};
use crate::structured::{diff_values, StructuredChange};
use crate::text::{build_text_diff, TextDiff};

/// A locale and its text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocaleEntry {
    pub locale: String,
    pub value: String,
}

/// Changes to a localized field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocalizedDiff {
    pub field: String,
    /// Locales only in the new map, sorted by locale.
    pub added: Vec<LocaleEntry>,
    /// Locales only in the old map, sorted by locale.
    pub removed: Vec<LocaleEntry>,
    /// Locales in both maps whose text differs.
    pub modified: BTreeMap<String, TextDiff>,
}

impl LocalizedDiff {
    /// Rebuild the new map from the old one using only this diff.
    pub fn apply(&self, base: &LocalizedMap) -> LocalizedMap {
        let mut out = base.clone();
        for entry in &self.removed {
            out.remove(&entry.locale);
        }
        for entry in &self.added {
            out.insert(entry.locale.clone(), entry.value.clone());
        }
        for (locale, diff) in &self.modified {
            out.insert(locale.clone(), diff.to.clone());
        }
        out
    }
}

/// Changed scalar, in normalized form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScalarDiff {
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Path-addressed changes to a structured field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StructuredDiff {
    pub field: String,
    pub changes: Vec<StructuredChange>,
}

impl StructuredDiff {
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of added paths.
    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, StructuredChange::Added { .. }))
            .count()
    }

    /// Number of removed paths.
    pub fn removals(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, StructuredChange::Removed { .. }))
            .count()
    }

    /// Number of modified paths.
    pub fn modifications(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| matches!(c, StructuredChange::Modified { .. }))
            .count()
    }
}

/// Changes to a plain text field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextFieldDiff {
    pub field: String,
    #[serde(flatten)]
    pub diff: TextDiff,
}

/// A typed field diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FieldDiff {
    Localized(LocalizedDiff),
    Scalar(ScalarDiff),
    Structured(StructuredDiff),
    Text(TextFieldDiff),
}

impl FieldDiff {
    pub fn field(&self) -> &str {
        match self {
            Self::Localized(d) => &d.field,
            Self::Scalar(d) => &d.field,
            Self::Structured(d) => &d.field,
            Self::Text(d) => &d.field,
        }
    }

    /// The variant produced, which differs from the declared kind when a
    /// malformed value fell back to scalar comparison.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Localized(_) => FieldKind::Localized,
            Self::Scalar(_) => FieldKind::Scalar,
            Self::Structured(_) => FieldKind::Structured,
            Self::Text(_) => FieldKind::Text,
        }
    }
}

/// Diff two localized maps. Missing maps count as empty.
pub fn diff_localized_field(
    name: &str,
    from: Option<&LocalizedMap>,
    to: Option<&LocalizedMap>,
) -> Option<LocalizedDiff> {
    let empty = LocalizedMap::new();
    let from = from.unwrap_or(&empty);
    let to = to.unwrap_or(&empty);

    let added: Vec<LocaleEntry> = to
        .iter()
        .filter(|(locale, _)| !from.contains_locale(locale))
        .map(|(locale, value)| LocaleEntry {
            locale: locale.to_string(),
            value: value.to_string(),
        })
        .collect();

    let removed: Vec<LocaleEntry> = from
        .iter()
        .filter(|(locale, _)| !to.contains_locale(locale))
        .map(|(locale, value)| LocaleEntry {
            locale: locale.to_string(),
            value: value.to_string(),
        })
        .collect();

    let modified: BTreeMap<String, TextDiff> = from
        .iter()
        .filter_map(|(locale, old)| {
            let new = to.get(locale)?;
            (old != new).then(|| {
                let label = format!("{name}.{locale}");
                (locale.to_string(), build_text_diff(&label, old, new))
            })
        })
        .collect();

    if added.is_empty() && removed.is_empty() && modified.is_empty() {
        return None;
    }

    Some(LocalizedDiff {
        field: name.to_string(),
        added,
        removed,
        modified,
    })
}

/// Diff two scalars by normalized string form.
pub fn diff_scalar_field(name: &str, from: &ScalarValue, to: &ScalarValue) -> Option<ScalarDiff> {
    let from = normalize_scalar(from);
    let to = normalize_scalar(to);
    if from == to {
        return None;
    }
    Some(ScalarDiff {
        field: name.to_string(),
        from,
        to,
    })
}

/// Diff two structured values path by path.
pub fn diff_structured_field(name: &str, from: &Value, to: &Value) -> Option<StructuredDiff> {
    let mut changes = Vec::new();
    diff_values(from, to, "", &mut changes);
    if changes.is_empty() {
        return None;
    }
    Some(StructuredDiff {
        field: name.to_string(),
        changes,
    })
}

/// Diff two texts. Missing text counts as empty.
pub fn diff_text_field(name: &str, from: Option<&str>, to: Option<&str>) -> Option<TextFieldDiff> {
    let from = from.unwrap_or_default();
    let to = to.unwrap_or_default();
    if from == to {
        return None;
    }
    Some(TextFieldDiff {
        field: name.to_string(),
        diff: build_text_diff(name, from, to),
    })
}

/// Diff one field of two revisions according to its declared kind.
///
/// A value whose shape does not fit the declared kind (say, a number in a
/// localized field) is compared as an opaque scalar instead.
pub fn diff_field(
    kind: FieldKind,
    name: &str,
    from: Option<&FieldValue>,
    to: Option<&FieldValue>,
) -> Option<FieldDiff> {
    match kind {
        FieldKind::Localized => match (localized_view(from), localized_view(to)) {
            (Some(old), Some(new)) => {
                diff_localized_field(name, Some(&old), Some(&new)).map(FieldDiff::Localized)
            }
            _ => opaque_scalar(name, from, to),
        },
        FieldKind::Scalar => opaque_scalar(name, from, to),
        FieldKind::Structured => {
            let old = from.map_or(Value::Null, FieldValue::to_json);
            let new = to.map_or(Value::Null, FieldValue::to_json);
            diff_structured_field(name, &old, &new).map(FieldDiff::Structured)
        }
        FieldKind::Text => match (text_view(from), text_view(to)) {
            (Some(old), Some(new)) => diff_text_field(name, old, new).map(FieldDiff::Text),
            _ => opaque_scalar(name, from, to),
        },
    }
}

fn opaque_scalar(name: &str, from: Option<&FieldValue>, to: Option<&FieldValue>) -> Option<FieldDiff> {
    let old = from.map_or_else(ScalarValue::null, ScalarValue::from);
    let new = to.map_or_else(ScalarValue::null, ScalarValue::from);
    diff_scalar_field(name, &old, &new).map(FieldDiff::Scalar)
}

/// `None` when the value is not shaped like a localized map.
fn localized_view(value: Option<&FieldValue>) -> Option<LocalizedMap> {
    match value {
        None | Some(FieldValue::Json(Value::Null)) => Some(LocalizedMap::new()),
        Some(FieldValue::Localized(map)) => Some(map.clone()),
        Some(FieldValue::Json(Value::Object(object))) => object
            .iter()
            .map(|(locale, text)| text.as_str().map(|t| (locale.clone(), t.to_string())))
            .collect::<Option<LocalizedMap>>(),
        Some(_) => None,
    }
}

/// Outer `None` when the value is not text; inner `None` when missing.
fn text_view(value: Option<&FieldValue>) -> Option<Option<&str>> {
    match value {
        None | Some(FieldValue::Json(Value::Null)) => Some(None),
        Some(other) => other.as_text().map(Some),
    }
}

/// Locales touched by a diff, for symmetry checks and summaries.
pub fn touched_locales(diff: &LocalizedDiff) -> BTreeSet<&str> {
    diff.added
        .iter()
        .chain(&diff.removed)
        .map(|e| e.locale.as_str())
        .chain(diff.modified.keys().map(String::as_str))
        .collect()
}
