use serde::Serialize;

use folio_diff::ChangeReport;
use folio_patch::{PatchDialect, PatchOptions};
use folio_types::{Revision, RevisionId, RevisionTag};

/// An agent's (or user's) request to patch one text field.
#[derive(Clone, Debug)]
pub struct EditRequest {
    pub field: String,
    /// Required for localized fields, ignored otherwise.
    pub locale: Option<String>,
    pub patch: String,
    pub dialect: PatchDialect,
    pub expected_field: Option<String>,
    pub user: Option<String>,
    pub agent: Option<String>,
    pub agent_version: Option<String>,
    /// Reject the edit unless this is still the current revision.
    pub base_revision: Option<RevisionId>,
}

impl EditRequest {
    pub fn new(field: impl Into<String>, patch: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            locale: None,
            patch: patch.into(),
            dialect: PatchDialect::default(),
            expected_field: None,
            user: None,
            agent: None,
            agent_version: None,
            base_revision: None,
        }
    }

    pub fn with_dialect(mut self, dialect: PatchDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn in_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn expecting_field(mut self, field: impl Into<String>) -> Self {
        self.expected_field = Some(field.into());
        self
    }

    pub fn by_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn by_agent(mut self, name: impl Into<String>, version: Option<String>) -> Self {
        self.agent = Some(name.into());
        self.agent_version = version;
        self
    }

    pub fn based_on(mut self, revision: RevisionId) -> Self {
        self.base_revision = Some(revision);
        self
    }

    pub fn patch_options(&self) -> PatchOptions {
        PatchOptions {
            expected_field: self.expected_field.clone(),
        }
    }

    /// `update`, plus `agent:<name>` and `agent_version:<v>` when set.
    pub fn tags(&self) -> Vec<RevisionTag> {
        let mut tags = vec![RevisionTag::Update];
        if let Some(agent) = &self.agent {
            tags.push(RevisionTag::Agent(agent.clone()));
        }
        if let Some(version) = &self.agent_version {
            tags.push(RevisionTag::AgentVersion(version.clone()));
        }
        tags
    }
}

/// Result of a successful edit.
#[derive(Clone, Debug, Serialize)]
pub struct EditOutcome {
    /// The revision the patch was applied to.
    pub previous: RevisionId,
    pub revision: Revision,
    pub report: ChangeReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder() {
        let base = RevisionId::new();
        let req = EditRequest::new("body", "@@ -1 +1 @@\n-a\n+b\n")
            .with_dialect(PatchDialect::Codex)
            .in_locale("en")
            .expecting_field("body")
            .by_user("ada")
            .by_agent("scribe", Some("1.2".into()))
            .based_on(base);
        assert_eq!(req.field, "body");
        assert_eq!(req.locale.as_deref(), Some("en"));
        assert_eq!(req.dialect, PatchDialect::Codex);
        assert_eq!(req.base_revision, Some(base));
        assert_eq!(req.patch_options().expected_field.as_deref(), Some("body"));
    }

    #[test]
    fn tags_include_agent() {
        let req = EditRequest::new("body", "").by_agent("scribe", Some("1.2".into()));
        let tags: Vec<String> = req.tags().iter().map(ToString::to_string).collect();
        assert_eq!(tags, vec!["update", "agent:scribe", "agent_version:1.2"]);

        let plain = EditRequest::new("body", "");
        assert_eq!(plain.tags(), vec![RevisionTag::Update]);
    }
}
