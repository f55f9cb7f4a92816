use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context};
use chrono::Utc;
use colored::Colorize;
use serde::Deserialize;
use serde_json::json;

use folio_diff::compare_revisions;
use folio_patch::{apply_patch, normalize_patch, parse_unified, PatchError, PatchOptions};
use folio_types::{DocumentId, FieldValue, Revision, RevisionId, RevisionTag};

use crate::cli::*;
use crate::config::FolioConfig;
use crate::render;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = FolioConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Diff(args) => cmd_diff(&config, cli.format, args),
        Command::Normalize(args) => cmd_normalize(&config, cli.format, args),
        Command::Apply(args) => cmd_apply(&config, cli.format, args),
    }
}

/// A revision as read from disk. Stored revisions parse as snapshots too;
/// their ids and timestamps are ignored.
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    tags: BTreeSet<RevisionTag>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
}

impl Snapshot {
    fn into_revision(self, document: DocumentId, previous: Option<RevisionId>) -> Revision {
        Revision {
            id: RevisionId::new(),
            document,
            previous,
            timestamp: Utc::now(),
            user: self.user,
            tags: self.tags,
            summary: None,
            deleted: self.deleted,
            fields: self.fields,
        }
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let text = read_input(path)?;
    serde_json::from_str(&text).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn resolve_kind(
    config: &FolioConfig,
    explicit: Option<String>,
    from: &Snapshot,
    to: &Snapshot,
) -> anyhow::Result<String> {
    explicit
        .or_else(|| to.kind.clone())
        .or_else(|| from.kind.clone())
        .or_else(|| config.default_kind.clone())
        .ok_or_else(|| anyhow!("no document kind: pass --kind or set default_kind in the configuration"))
}

fn cmd_diff(config: &FolioConfig, format: OutputFormat, args: DiffArgs) -> anyhow::Result<()> {
    let from = read_snapshot(&args.from)?;
    let to = read_snapshot(&args.to)?;
    let kind = resolve_kind(config, args.kind, &from, &to)?;
    let schema = config
        .schema(&kind)
        .ok_or_else(|| anyhow!("no schema for document kind {kind:?} in the configuration"))?;

    let document = DocumentId::new();
    let from = from.into_revision(document, None);
    let to = to.into_revision(document, Some(from.id));
    let report = compare_revisions(schema, Some(&from), &to);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => render::print_report(&report),
    }
    Ok(())
}

fn cmd_normalize(config: &FolioConfig, format: OutputFormat, args: NormalizeArgs) -> anyhow::Result<()> {
    let patch = read_input(&args.patch)?;
    let dialect = args.dialect.unwrap_or(config.default_dialect);
    let options = patch_options(args.field);

    let normalized = normalize_patch(&patch, dialect, &options)
        .and_then(|normalized| parse_unified(&normalized).map(|parsed| (normalized, parsed)));
    let (normalized, parsed) = match normalized {
        Ok(pair) => pair,
        Err(err) => return Err(patch_failure(format, err)),
    };

    match format {
        OutputFormat::Json => {
            let out = json!({
                "dialect": dialect,
                "target": parsed.target(),
                "stats": parsed.stats(),
                "patch": normalized,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print!("{normalized}"),
    }
    Ok(())
}

fn cmd_apply(config: &FolioConfig, format: OutputFormat, args: ApplyArgs) -> anyhow::Result<()> {
    let base = read_input(&args.base)?;
    let patch = read_input(&args.patch)?;
    let dialect = args.dialect.unwrap_or(config.default_dialect);
    let options = patch_options(args.field);

    let result = match apply_patch(&base, &patch, dialect, &options) {
        Ok(result) => result,
        Err(err) => return Err(patch_failure(format, err)),
    };

    if let Some(output) = &args.output {
        std::fs::write(output, &result)
            .with_context(|| format!("cannot write {}", output.display()))?;
    }

    match (format, &args.output) {
        (OutputFormat::Json, output) => {
            let out = json!({
                "output": output.as_ref().map(|p| p.display().to_string()),
                "text": result,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        (OutputFormat::Text, Some(output)) => {
            println!("{} Patched {}", "✓".green().bold(), output.display().to_string().bold());
        }
        (OutputFormat::Text, None) => print!("{result}"),
    }
    Ok(())
}

fn patch_options(field: Option<String>) -> PatchOptions {
    PatchOptions {
        expected_field: field,
    }
}

/// Report a patch error in the requested format and turn it into the
/// command's failure.
fn patch_failure(format: OutputFormat, err: PatchError) -> anyhow::Error {
    let kind = err.kind();
    if format == OutputFormat::Json {
        let out = json!({
            "error": kind,
            "message": err.to_string(),
            "retryable": err.is_retryable(),
        });
        println!("{out}");
    }
    anyhow::Error::new(err).context(format!("patch rejected ({kind})"))
}
