//! Scalar normalization and canonical JSON.
//!
//! Two values are "the same" for diffing purposes when their normalized
//! strings are equal. Objects are canonicalized explicitly (keys sorted at
//! every level) rather than relying on any map's iteration order.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use folio_types::FieldValue;

/// A primitive, date, or opaque JSON value to be normalized.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Date(DateTime<Utc>),
    Json(Value),
}

impl ScalarValue {
    /// The null scalar (also used for "field missing").
    pub fn null() -> Self {
        Self::Json(Value::Null)
    }
}

impl From<Value> for ScalarValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Date(at)
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Json(Value::String(s.to_string()))
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::Json(Value::String(s))
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Json(Value::Bool(b))
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<&FieldValue> for ScalarValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Date(at) => Self::Date(*at),
            other => Self::Json(other.to_json()),
        }
    }
}

/// Normalize a scalar into its comparable string form.
///
/// - null → `None`
/// - dates → ISO-8601 UTC with millisecond precision
/// - strings → unchanged
/// - numbers and booleans → decimal / `"true"` / `"false"`
/// - objects and arrays → [`canonical_json`]
pub fn normalize_scalar(value: &ScalarValue) -> Option<String> {
    match value {
        ScalarValue::Date(at) => Some(format_date(at)),
        ScalarValue::Json(Value::Null) => None,
        ScalarValue::Json(Value::String(s)) => Some(s.clone()),
        ScalarValue::Json(Value::Bool(b)) => Some(b.to_string()),
        ScalarValue::Json(Value::Number(n)) => Some(canonical_number(n)),
        ScalarValue::Json(other) => Some(canonical_json(other)),
    }
}

/// `2024-03-01T12:00:00.000Z`
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Deterministic JSON serialization with object keys sorted at every level.
///
/// Arrays keep their order. Numbers use [`canonical_number`], so `1` and
/// `1.0` serialize identically.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&canonical_number(n)),
        Value::String(s) => out.push_str(&Value::from(s.as_str()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

/// Shortest decimal form of a JSON number; integral floats drop the `.0`.
pub fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // -0 and 0 compare equal.
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn null_is_none() {
        assert_eq!(normalize_scalar(&ScalarValue::null()), None);
    }

    #[test]
    fn strings_pass_through() {
        assert_eq!(normalize_scalar(&"  spaced ".into()), Some("  spaced ".into()));
    }

    #[test]
    fn numbers_and_booleans() {
        assert_eq!(normalize_scalar(&42i64.into()), Some("42".into()));
        assert_eq!(normalize_scalar(&1.5f64.into()), Some("1.5".into()));
        assert_eq!(normalize_scalar(&1.0f64.into()), Some("1".into()));
        assert_eq!(normalize_scalar(&true.into()), Some("true".into()));
        assert_eq!(normalize_scalar(&false.into()), Some("false".into()));
    }

    #[test]
    fn dates_are_utc_millis() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(
            normalize_scalar(&at.into()),
            Some("2024-03-01T12:30:05.000Z".into())
        );
    }

    #[test]
    fn objects_serialize_with_sorted_keys() {
        let value = json!({"b": 1, "a": {"d": [2, 1], "c": null}});
        assert_eq!(
            normalize_scalar(&value.into()),
            Some(r#"{"a":{"c":null,"d":[2,1]},"b":1}"#.into())
        );
    }

    #[test]
    fn key_order_never_matters() {
        let a: Value = serde_json::from_str(r#"{"x":1,"y":{"p":true,"q":"s"}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"y":{"q":"s","p":true},"x":1}"#).unwrap();
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn integral_float_equals_integer() {
        assert_eq!(canonical_json(&json!([1.0, -0.0])), canonical_json(&json!([1, 0])));
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(canonical_json(&json!({"k\"": "a\nb"})), r#"{"k\"":"a\nb"}"#);
    }

    #[test]
    fn field_values_convert() {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(ScalarValue::from(&FieldValue::Date(at)), ScalarValue::Date(at));
        assert_eq!(
            ScalarValue::from(&FieldValue::text("x")),
            ScalarValue::Json(json!("x"))
        );
    }
}
