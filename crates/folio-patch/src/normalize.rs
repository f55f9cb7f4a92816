//! Dialect-specific validation and rewriting into canonical unified text.

use tracing::debug;

use crate::dialect::{PatchDialect, PatchOptions};
use crate::error::{PatchError, PatchResult};
use crate::hunk::parse_hunk_header;

pub const BEGIN_PATCH: &str = "*** Begin Patch";
pub const END_PATCH: &str = "*** End Patch";

const UPDATE_FILE: &str = "*** Update File:";
const ADD_FILE: &str = "*** Add File:";
const DELETE_FILE: &str = "*** Delete File:";
const MOVE_TO: &str = "*** Move to:";

/// Label used when a bare unified patch has no file header and the caller
/// named no field.
const DEFAULT_LABEL: &str = "field";

/// Validate `patch` in the given dialect and rewrite it as canonical unified
/// diff text ending in a newline.
///
/// Codex envelopes may have whitespace, blank lines included, before
/// `*** Begin Patch` and trailing whitespace on that line. In both dialects a
/// hunk header may carry a section heading after its closing `@@`; it is
/// kept as is.
pub fn normalize_patch(
    patch: &str,
    dialect: PatchDialect,
    options: &PatchOptions,
) -> PatchResult<String> {
    let normalized = match dialect {
        PatchDialect::Unified => normalize_unified(patch, options)?,
        PatchDialect::Codex => normalize_codex(patch, options)?,
    };
    debug!(%dialect, bytes = normalized.len(), "patch normalized");
    Ok(normalized)
}

fn normalize_unified(patch: &str, options: &PatchOptions) -> PatchResult<String> {
    if patch.contains(BEGIN_PATCH) {
        return Err(PatchError::unsupported(format!(
            "unified patch contains the codex marker {BEGIN_PATCH:?}; submit it as dialect \"codex\""
        )));
    }
    if !patch.contains("@@") {
        return Err(PatchError::unsupported("unified patch has no hunk header (\"@@\")"));
    }

    let lines: Vec<&str> = patch.lines().collect();
    for line in lines.iter().filter(|l| l.starts_with("@@")) {
        parse_hunk_header(line)?;
    }

    let first_hunk = lines.iter().position(|l| l.starts_with("@@")).unwrap_or(0);
    let has_file_header = lines[..first_hunk]
        .windows(2)
        .any(|w| w[0].starts_with("--- ") && w[1].starts_with("+++ "));

    let mut out = String::with_capacity(patch.len() + 32);
    if !has_file_header {
        let label = options.expected_field.as_deref().unwrap_or(DEFAULT_LABEL);
        out.push_str(&file_header(label));
    }
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

fn normalize_codex(patch: &str, options: &PatchOptions) -> PatchResult<String> {
    let mut lines = patch.trim_start().lines();

    match lines.next() {
        Some(first) if first.trim_end() == BEGIN_PATCH => {}
        Some(first) => {
            return Err(PatchError::unsupported(format!(
                "codex patch must start with {BEGIN_PATCH:?}, found {first:?}"
            )));
        }
        None => return Err(PatchError::unsupported("codex patch is empty")),
    }

    let mut target: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();
    let mut seen_hunk = false;

    for line in lines {
        if let Some(rest) = line.strip_prefix(UPDATE_FILE) {
            if target.is_some() {
                return Err(PatchError::unsupported(
                    "codex patch updates more than one file; submit one patch per field",
                ));
            }
            let path = rest.trim();
            let path = path.strip_prefix('/').unwrap_or(path);
            if path.is_empty() {
                return Err(PatchError::unsupported(format!(
                    "codex directive names no file: {line:?}"
                )));
            }
            target = Some(path.to_string());
            continue;
        }
        for directive in [ADD_FILE, DELETE_FILE, MOVE_TO] {
            if line.starts_with(directive) {
                return Err(PatchError::unsupported(format!(
                    "codex directive {directive:?} is not supported; only {UPDATE_FILE:?} is accepted"
                )));
            }
        }
        if line.starts_with("***") {
            // End Patch, End of File and similar markers carry no content.
            continue;
        }

        if line.starts_with("@@") {
            parse_hunk_header(line)?;
            seen_hunk = true;
            body.push(line);
        } else if line.starts_with(['+', '-', ' ']) {
            if !seen_hunk && (line.starts_with("--- ") || line.starts_with("+++ ")) {
                continue;
            }
            if target.is_none() {
                return Err(PatchError::unsupported(format!(
                    "hunk content before {UPDATE_FILE:?}: {line:?}"
                )));
            }
            body.push(line);
        }
    }

    let Some(target) = target else {
        return Err(PatchError::unsupported(format!(
            "codex patch has no {UPDATE_FILE:?} directive"
        )));
    };
    if !seen_hunk {
        return Err(PatchError::unsupported("codex patch has no hunk header (\"@@\")"));
    }
    if let Some(expected) = options.expected_field.as_deref() {
        if expected != target {
            return Err(PatchError::TargetMismatch {
                expected: expected.to_string(),
                actual: target,
            });
        }
    }

    let mut out = file_header(&target);
    for line in body {
        out.push_str(line);
        out.push('\n');
    }
    Ok(out)
}

fn file_header(label: &str) -> String {
    format!("--- a/{label}\n+++ b/{label}\n")
}
