//! Text diff: line-by-line comparison of long-form text.
//!
//! Uses the `similar` crate (Myers diff algorithm). Both sides are given a
//! trailing newline before diffing so output does not depend on whether the
//! source ended with one.

use std::borrow::Cow;

use serde::Serialize;
use similar::{ChangeTag, DiffTag, TextDiff as LineDiff};

/// Lines of context around each hunk.
pub const CONTEXT_LINES: usize = 2;

/// The result of diffing two texts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextDiff {
    /// Normalized label, used as both file names in the unified diff.
    pub label: String,
    /// Standard unified diff (empty when the texts are equal).
    pub unified_diff: String,
    pub added_lines: usize,
    pub removed_lines: usize,
    /// The texts as supplied by the caller.
    pub from: String,
    pub to: String,
    /// The same hunks as `unified_diff`, for side-by-side renderers.
    pub hunks: Vec<DiffHunk>,
}

impl TextDiff {
    /// Returns `true` if no line was added or removed.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

/// A contiguous region of changes in a diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffHunk {
    /// Line number in the old content where this hunk starts (1-based).
    pub old_start: usize,
    /// Number of lines from the old content in this hunk.
    pub old_count: usize,
    /// Line number in the new content where this hunk starts (1-based).
    pub new_start: usize,
    /// Number of lines from the new content in this hunk.
    pub new_count: usize,
    /// The individual diff lines in this hunk.
    pub lines: Vec<DiffLine>,
}

/// A single line in a diff hunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "tag", content = "text", rename_all = "lowercase")]
pub enum DiffLine {
    /// A line present in both old and new (context).
    Context(String),
    /// A line added in the new content.
    Added(String),
    /// A line removed from the old content.
    Removed(String),
}

/// Append a newline unless the text already ends with one.
pub fn ensure_trailing_newline(text: &str) -> Cow<'_, str> {
    if text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{text}\n"))
    }
}

/// Trim the label and collapse inner whitespace runs to `_`, so it is a
/// single token on the `---`/`+++` lines. An empty label becomes `field`.
pub fn normalize_label(label: &str) -> String {
    let joined = label.split_whitespace().collect::<Vec<_>>().join("_");
    if joined.is_empty() {
        "field".to_string()
    } else {
        joined
    }
}

/// Number of lines in a diff chunk. A trailing newline does not start a
/// new line.
fn count_lines(chunk: &str) -> usize {
    if chunk.is_empty() {
        return 0;
    }
    let segments = chunk.split('\n').count();
    if chunk.ends_with('\n') {
        segments - 1
    } else {
        segments
    }
}

/// Diff two texts.
///
/// Produces a unified diff with [`CONTEXT_LINES`] lines of context, using
/// the normalized `label` for both file names, plus added/removed line
/// counts.
pub fn build_text_diff(label: &str, from: &str, to: &str) -> TextDiff {
    let label = normalize_label(label);
    let old = ensure_trailing_newline(from);
    let new = ensure_trailing_newline(to);

    let diff = LineDiff::from_lines(old.as_ref(), new.as_ref());

    let unified_diff = diff
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .header(&label, &label)
        .to_string();

    let mut added_lines = 0;
    let mut removed_lines = 0;
    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if matches!(tag, DiffTag::Delete | DiffTag::Replace) {
            removed_lines += count_lines(&diff.old_slices()[old_range].concat());
        }
        if matches!(tag, DiffTag::Insert | DiffTag::Replace) {
            added_lines += count_lines(&diff.new_slices()[new_range].concat());
        }
    }

    let hunks = collect_hunks(&diff);

    TextDiff {
        label,
        unified_diff,
        added_lines,
        removed_lines,
        from: from.to_string(),
        to: to.to_string(),
        hunks,
    }
}

fn collect_hunks(diff: &LineDiff<'_, '_, '_, str>) -> Vec<DiffHunk> {
    let mut hunks = Vec::new();

    for group in diff.grouped_ops(CONTEXT_LINES) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;

        let mut lines = Vec::new();
        for op in &group {
            for change in diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                lines.push(match change.tag() {
                    ChangeTag::Equal => DiffLine::Context(text),
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                });
            }
        }

        hunks.push(DiffHunk {
            old_start: old_range.start + 1,
            old_count: old_range.len(),
            new_start: new_range.start + 1,
            new_count: new_range.len(),
            lines,
        });
    }

    hunks
}
