use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// A free-form tag attached to a revision.
///
/// Tags record why a revision exists: the operation (`create`, `update`,
/// `delete`) and, for automated edits, which agent produced it. Anything
/// that is not a known tag round-trips verbatim as [`RevisionTag::Custom`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RevisionTag {
    Create,
    Update,
    Delete,
    /// `agent:<name>`
    Agent(String),
    /// `agent_version:<version>`
    AgentVersion(String),
    Custom(String),
}

impl RevisionTag {
    /// Returns `true` for `agent:` and `agent_version:` tags.
    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent(_) | Self::AgentVersion(_))
    }
}

impl fmt::Display for RevisionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Agent(name) => write!(f, "agent:{name}"),
            Self::AgentVersion(version) => write!(f, "agent_version:{version}"),
            Self::Custom(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for RevisionTag {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TypeError::InvalidTag(s.to_string()));
        }
        let tag = match s {
            "create" => Self::Create,
            "update" => Self::Update,
            "delete" => Self::Delete,
            _ => {
                if let Some(version) = s.strip_prefix("agent_version:") {
                    Self::AgentVersion(version.to_string())
                } else if let Some(name) = s.strip_prefix("agent:") {
                    Self::Agent(name.to_string())
                } else {
                    Self::Custom(s.to_string())
                }
            }
        };
        Ok(tag)
    }
}

impl Serialize for RevisionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RevisionTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_parse() {
        assert_eq!("create".parse::<RevisionTag>().unwrap(), RevisionTag::Create);
        assert_eq!("update".parse::<RevisionTag>().unwrap(), RevisionTag::Update);
        assert_eq!(
            "agent:citation-bot".parse::<RevisionTag>().unwrap(),
            RevisionTag::Agent("citation-bot".into())
        );
        assert_eq!(
            "agent_version:1.4.2".parse::<RevisionTag>().unwrap(),
            RevisionTag::AgentVersion("1.4.2".into())
        );
    }

    #[test]
    fn unknown_tags_are_custom() {
        let tag: RevisionTag = "import:legacy".parse().unwrap();
        assert_eq!(tag, RevisionTag::Custom("import:legacy".into()));
        assert_eq!(tag.to_string(), "import:legacy");
    }

    #[test]
    fn empty_tag_rejected() {
        assert!("".parse::<RevisionTag>().is_err());
    }

    #[test]
    fn display_matches_wire_form() {
        assert_eq!(RevisionTag::Agent("x".into()).to_string(), "agent:x");
        assert_eq!(RevisionTag::AgentVersion("2".into()).to_string(), "agent_version:2");
    }

    #[test]
    fn serde_uses_string_form() {
        let tags = vec![RevisionTag::Create, RevisionTag::Agent("bot".into())];
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"["create","agent:bot"]"#);
        let parsed: Vec<RevisionTag> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tags);
    }

    #[test]
    fn agent_predicate() {
        assert!(RevisionTag::Agent("a".into()).is_agent());
        assert!(!RevisionTag::Update.is_agent());
    }
}
