use std::path::{Path, PathBuf};

use anyhow::Context;
use folio_patch::PatchDialect;
use folio_types::DocumentSchema;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "folio.toml";

/// Settings read from `folio.toml`.
///
/// ```toml
/// default_dialect = "codex"
/// default_kind = "wiki"
///
/// [[schema]]
/// kind = "wiki"
/// fields = [
///     { name = "title", kind = "localized" },
///     { name = "body", kind = "text" },
/// ]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Dialect used when a command gets no `--dialect`.
    pub default_dialect: PatchDialect,
    /// Kind used by `folio diff` when neither `--kind` nor the snapshot names one.
    pub default_kind: Option<String>,
    #[serde(rename = "schema")]
    pub schemas: Vec<DocumentSchema>,
}

impl FolioConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text).context("invalid configuration")?;
        for schema in &config.schemas {
            schema
                .validate()
                .with_context(|| format!("invalid schema for kind {:?}", schema.kind))?;
        }
        Ok(config)
    }

    /// Load `path`, or `./folio.toml` if it exists, or the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path: PathBuf = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                if !local.exists() {
                    return Ok(Self::default());
                }
                local
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config = Self::from_toml(&text).with_context(|| format!("in {}", path.display()))?;
        tracing::debug!(path = %path.display(), schemas = config.schemas.len(), "configuration loaded");
        Ok(config)
    }

    pub fn schema(&self, kind: &str) -> Option<&DocumentSchema> {
        self.schemas.iter().find(|s| s.kind == kind)
    }
}
