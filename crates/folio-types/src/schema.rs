//! Per-document-kind field declarations.
//!
//! The schema is how a caller declares which diff function applies to each
//! field. Field kind is never inferred from a stored value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// How a field is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Locale-keyed text ([`LocalizedMap`](crate::LocalizedMap)).
    Localized,
    /// Primitive or date value compared by normalized string form.
    Scalar,
    /// Nested maps/sequences compared path by path.
    Structured,
    /// Long-form text compared line by line.
    Text,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Localized => write!(f, "localized"),
            Self::Scalar => write!(f, "scalar"),
            Self::Structured => write!(f, "structured"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "localized" => Ok(Self::Localized),
            "scalar" => Ok(Self::Scalar),
            "structured" => Ok(Self::Structured),
            "text" => Ok(Self::Text),
            other => Err(TypeError::InvalidFieldKind(other.to_string())),
        }
    }
}

/// One declared field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered field declarations for one document kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSchema {
    /// Document kind, e.g. `wiki`, `post`, `citation`.
    pub kind: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl DocumentSchema {
    /// Create a schema with no fields.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
        }
    }

    /// Declare another field. Later declarations of the same name are
    /// rejected by [`validate`](Self::validate).
    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec::new(name, kind));
        self
    }

    /// Kind of a declared field.
    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        self.fields.iter().find(|f| f.name == field).map(|f| f.kind)
    }

    /// Like [`kind_of`](Self::kind_of), but an undeclared field is an error.
    pub fn require(&self, field: &str) -> Result<FieldKind, TypeError> {
        self.kind_of(field).ok_or_else(|| TypeError::UnknownField {
            kind: self.kind.clone(),
            field: field.to_string(),
        })
    }

    /// Check that field names are unique.
    pub fn validate(&self) -> Result<(), TypeError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.fields {
            if !seen.insert(spec.name.as_str()) {
                return Err(TypeError::DuplicateField(spec.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wiki() -> DocumentSchema {
        DocumentSchema::new("wiki")
            .with_field("title", FieldKind::Localized)
            .with_field("body", FieldKind::Localized)
            .with_field("slug", FieldKind::Scalar)
            .with_field("sources", FieldKind::Structured)
    }

    #[test]
    fn kind_lookup() {
        let schema = wiki();
        assert_eq!(schema.kind_of("slug"), Some(FieldKind::Scalar));
        assert_eq!(schema.kind_of("missing"), None);
        assert!(matches!(
            schema.require("missing"),
            Err(TypeError::UnknownField { .. })
        ));
    }

    #[test]
    fn duplicate_fields_rejected() {
        let schema = wiki().with_field("slug", FieldKind::Text);
        assert_eq!(
            schema.validate(),
            Err(TypeError::DuplicateField("slug".into()))
        );
        assert!(wiki().validate().is_ok());
    }

    #[test]
    fn field_kind_parse_and_display() {
        for kind in [
            FieldKind::Localized,
            FieldKind::Scalar,
            FieldKind::Structured,
            FieldKind::Text,
        ] {
            assert_eq!(kind.to_string().parse::<FieldKind>().unwrap(), kind);
        }
        assert!("blob".parse::<FieldKind>().is_err());
    }

    #[test]
    fn deserializes_lowercase_kinds() {
        let schema: DocumentSchema = serde_json::from_str(
            r#"{"kind":"claim","fields":[{"name":"statement","kind":"text"}]}"#,
        )
        .unwrap();
        assert_eq!(schema.kind_of("statement"), Some(FieldKind::Text));
    }
}
