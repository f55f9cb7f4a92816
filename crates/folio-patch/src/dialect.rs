use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PatchError;

/// Patch syntax accepted from callers.
///
/// Selected explicitly by the caller; patch content is never sniffed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchDialect {
    /// Standard unified diff.
    #[default]
    Unified,
    /// Sectioned `*** Begin Patch` format produced by coding agents.
    Codex,
}

impl fmt::Display for PatchDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unified => write!(f, "unified"),
            Self::Codex => write!(f, "codex"),
        }
    }
}

impl FromStr for PatchDialect {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unified" => Ok(Self::Unified),
            "codex" => Ok(Self::Codex),
            other => Err(PatchError::unsupported(format!(
                "unknown patch dialect {other:?} (expected \"unified\" or \"codex\")"
            ))),
        }
    }
}

/// Per-call options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchOptions {
    /// When set, a codex patch must update exactly this field.
    pub expected_field: Option<String>,
}

impl PatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expecting_field(mut self, field: impl Into<String>) -> Self {
        self.expected_field = Some(field.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!("unified".parse::<PatchDialect>().unwrap(), PatchDialect::Unified);
        assert_eq!("codex".parse::<PatchDialect>().unwrap(), PatchDialect::Codex);
        assert_eq!(PatchDialect::Codex.to_string(), "codex");
        assert!("git".parse::<PatchDialect>().is_err());
    }

    #[test]
    fn default_is_unified() {
        assert_eq!(PatchDialect::default(), PatchDialect::Unified);
    }

    #[test]
    fn options_builder() {
        let opts = PatchOptions::new().expecting_field("body");
        assert_eq!(opts.expected_field.as_deref(), Some("body"));
    }
}
