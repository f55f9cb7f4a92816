//! Structured diff: recursive, path-addressed comparison of JSON values.
//!
//! Equality is canonical (object key order is irrelevant, array order is
//! significant). Paths follow JSON Pointer: segments are joined with `/`,
//! and `~` / `/` inside a segment are escaped as `~0` / `~1`. A change at
//! the root is reported at path `/`.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::scalar::canonical_json;

/// A single change inside a structured value.
///
/// Values are carried in canonical JSON form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum StructuredChange {
    /// A key or array element present only in the new value.
    Added { path: String, value: String },
    /// A key or array element present only in the old value.
    Removed { path: String, value: String },
    /// A leaf whose value (or type) changed.
    Modified {
        path: String,
        from: String,
        to: String,
    },
}

impl StructuredChange {
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. } | Self::Removed { path, .. } | Self::Modified { path, .. } => {
                path
            }
        }
    }

    /// `added`, `removed` or `modified`.
    pub fn op(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Removed { .. } => "removed",
            Self::Modified { .. } => "modified",
        }
    }
}

/// Renders as `<op>:<path>`, e.g. `modified:/b/c`.
impl fmt::Display for StructuredChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.op(), self.path())
    }
}

/// Canonical equality: same structure, any object key order.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    canonical_json(a) == canonical_json(b)
}

/// Escape one path segment (`~` → `~0`, `/` → `~1`).
pub fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['~', '/']) {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

fn child_path(base: &str, segment: &str) -> String {
    format!("{base}/{}", escape_segment(segment))
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Append the changes between `a` and `b` to `sink`.
///
/// `base_path` is an already-escaped pointer (`""` for the root).
///
/// - Equal values emit nothing.
/// - Two arrays are compared index by index up to the longer length.
/// - Two objects are compared over the sorted union of their keys.
/// - Anything else (type mismatch, differing scalars) is one `Modified`
///   at `base_path`. This includes an array on one side only: an array
///   against an object or scalar is replaced whole, never diffed by element.
pub fn diff_values(a: &Value, b: &Value, base_path: &str, sink: &mut Vec<StructuredChange>) {
    if values_equal(a, b) {
        return;
    }

    match (a, b) {
        (Value::Array(old), Value::Array(new)) => {
            for i in 0..old.len().max(new.len()) {
                let path = child_path(base_path, &i.to_string());
                match (old.get(i), new.get(i)) {
                    (Some(x), Some(y)) => diff_values(x, y, &path, sink),
                    (None, Some(y)) => sink.push(StructuredChange::Added {
                        path,
                        value: canonical_json(y),
                    }),
                    (Some(x), None) => sink.push(StructuredChange::Removed {
                        path,
                        value: canonical_json(x),
                    }),
                    (None, None) => {}
                }
            }
        }
        (Value::Object(old), Value::Object(new)) => {
            let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
            for key in keys {
                let path = child_path(base_path, key);
                match (old.get(key), new.get(key)) {
                    (Some(x), Some(y)) => diff_values(x, y, &path, sink),
                    (None, Some(y)) => sink.push(StructuredChange::Added {
                        path,
                        value: canonical_json(y),
                    }),
                    (Some(x), None) => sink.push(StructuredChange::Removed {
                        path,
                        value: canonical_json(x),
                    }),
                    (None, None) => {}
                }
            }
        }
        _ => sink.push(StructuredChange::Modified {
            path: display_path(base_path),
            from: canonical_json(a),
            to: canonical_json(b),
        }),
    }
}
