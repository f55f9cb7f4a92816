//! Canonical unified-diff parsing.
//!
//! Hunk bodies are consumed by the counts in their headers, so a body that is
//! shorter or longer than its header claims is rejected here rather than
//! guessed at during application.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{PatchError, PatchResult};

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(?: .*)?$")
        .expect("hunk header pattern is valid")
});

const NO_NEWLINE_MARKER: char = '\\';

/// Line ranges from an `@@ -a,b +c,d @@` header. Omitted counts are 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HunkHeader {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
}

/// Parse and validate a single hunk header line.
///
/// An optional section heading after the closing `@@` is allowed; anything
/// else fails with the offending line quoted.
pub fn parse_hunk_header(line: &str) -> PatchResult<HunkHeader> {
    let caps = HUNK_HEADER
        .captures(line)
        .ok_or_else(|| PatchError::unsupported(format!("invalid hunk header: {line:?}")))?;

    let number = |idx: usize, default: usize| -> PatchResult<usize> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().map_err(|_| {
                PatchError::unsupported(format!("line number out of range in hunk header: {line:?}"))
            }),
            None => Ok(default),
        }
    };

    Ok(HunkHeader {
        old_start: number(1, 0)?,
        old_count: number(2, 1)?,
        new_start: number(3, 0)?,
        new_count: number(4, 1)?,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Remove,
    Add,
}

/// One body line of a hunk, without its one-character prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatchLine {
    pub kind: LineKind,
    pub text: String,
    /// Followed by a `\ No newline at end of file` marker.
    pub no_newline: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub header: HunkHeader,
    pub lines: Vec<PatchLine>,
}

impl Hunk {
    pub fn added(&self) -> usize {
        self.count(LineKind::Add)
    }

    pub fn removed(&self) -> usize {
        self.count(LineKind::Remove)
    }

    fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }
}

/// Aggregate line counts of a parsed patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PatchStats {
    pub hunks: usize,
    pub added: usize,
    pub removed: usize,
}

/// A single-target unified diff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParsedPatch {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub hunks: Vec<Hunk>,
}

impl ParsedPatch {
    /// The field the patch writes to, from the `+++` header.
    pub fn target(&self) -> Option<&str> {
        self.new_path.as_deref().or(self.old_path.as_deref())
    }

    pub fn stats(&self) -> PatchStats {
        PatchStats {
            hunks: self.hunks.len(),
            added: self.hunks.iter().map(Hunk::added).sum(),
            removed: self.hunks.iter().map(Hunk::removed).sum(),
        }
    }

    /// The patch that undoes this one: sides swapped, additions and removals
    /// exchanged.
    pub fn reversed(&self) -> ParsedPatch {
        let hunks = self
            .hunks
            .iter()
            .map(|hunk| Hunk {
                header: HunkHeader {
                    old_start: hunk.header.new_start,
                    old_count: hunk.header.new_count,
                    new_start: hunk.header.old_start,
                    new_count: hunk.header.old_count,
                },
                lines: hunk
                    .lines
                    .iter()
                    .map(|line| PatchLine {
                        kind: match line.kind {
                            LineKind::Add => LineKind::Remove,
                            LineKind::Remove => LineKind::Add,
                            LineKind::Context => LineKind::Context,
                        },
                        ..line.clone()
                    })
                    .collect(),
            })
            .collect();
        ParsedPatch {
            old_path: self.new_path.clone(),
            new_path: self.old_path.clone(),
            hunks,
        }
    }
}

/// Parse canonical unified-diff text into hunks.
///
/// Lines before the first `---`/`+++` pair or hunk (such as `diff --git` or
/// `index` lines) are ignored. A second file header is rejected: a patch
/// edits exactly one field.
pub fn parse_unified(text: &str) -> PatchResult<ParsedPatch> {
    let lines: Vec<&str> = text.lines().collect();
    let mut patch = ParsedPatch {
        old_path: None,
        new_path: None,
        hunks: Vec::new(),
    };
    let mut seen_file_header = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.starts_with("@@") {
            let number = patch.hunks.len() + 1;
            let header = parse_hunk_header(line)?;
            let (hunk, next) = parse_hunk_body(&lines, i + 1, number, header)?;
            patch.hunks.push(hunk);
            i = next;
            continue;
        }

        if line.starts_with("--- ") && lines.get(i + 1).is_some_and(|l| l.starts_with("+++ ")) {
            if seen_file_header {
                return Err(PatchError::unsupported(
                    "patch touches more than one file; submit one patch per field",
                ));
            }
            seen_file_header = true;
            patch.old_path = header_path(&line[4..], "a/");
            patch.new_path = header_path(&lines[i + 1][4..], "b/");
            i += 2;
            continue;
        }

        if !patch.hunks.is_empty() && !line.trim().is_empty() {
            return Err(PatchError::unsupported(format!(
                "unexpected line after hunk {}: {line:?}",
                patch.hunks.len()
            )));
        }
        i += 1;
    }

    if patch.hunks.is_empty() {
        return Err(PatchError::unsupported("patch contains no hunks"));
    }
    Ok(patch)
}

fn parse_hunk_body(
    lines: &[&str],
    start: usize,
    number: usize,
    header: HunkHeader,
) -> PatchResult<(Hunk, usize)> {
    let mut body: Vec<PatchLine> = Vec::new();
    let (mut old_seen, mut new_seen) = (0usize, 0usize);
    let mut i = start;

    while old_seen < header.old_count || new_seen < header.new_count {
        let Some(&line) = lines.get(i) else {
            return Err(PatchError::unsupported(format!(
                "hunk {number} ends early: header declares {} old and {} new lines, body has {old_seen} and {new_seen}",
                header.old_count, header.new_count
            )));
        };

        let (kind, text) = match line.chars().next() {
            // Some tools strip the single space from blank context lines.
            None => (LineKind::Context, ""),
            Some(' ') => (LineKind::Context, &line[1..]),
            Some('-') => (LineKind::Remove, &line[1..]),
            Some('+') => (LineKind::Add, &line[1..]),
            Some(NO_NEWLINE_MARKER) => {
                mark_no_newline(&mut body, number, line)?;
                i += 1;
                continue;
            }
            Some(_) => {
                return Err(PatchError::unsupported(format!(
                    "unexpected line in hunk {number}: {line:?}"
                )));
            }
        };

        match kind {
            LineKind::Context => {
                old_seen += 1;
                new_seen += 1;
            }
            LineKind::Remove => old_seen += 1,
            LineKind::Add => new_seen += 1,
        }
        if old_seen > header.old_count || new_seen > header.new_count {
            return Err(PatchError::unsupported(format!(
                "hunk {number} body does not match its header {} old / {} new lines",
                header.old_count, header.new_count
            )));
        }

        body.push(PatchLine {
            kind,
            text: text.to_string(),
            no_newline: false,
        });
        i += 1;
    }

    if let Some(&line) = lines.get(i) {
        if line.starts_with(NO_NEWLINE_MARKER) {
            mark_no_newline(&mut body, number, line)?;
            i += 1;
        }
    }

    Ok((Hunk { header, lines: body }, i))
}

fn mark_no_newline(body: &mut [PatchLine], number: usize, line: &str) -> PatchResult<()> {
    match body.last_mut() {
        Some(last) => {
            last.no_newline = true;
            Ok(())
        }
        None => Err(PatchError::unsupported(format!(
            "hunk {number} starts with a marker line: {line:?}"
        ))),
    }
}

/// Strip a `a/`/`b/` prefix and any tab-separated timestamp.
fn header_path(raw: &str, prefix: &str) -> Option<String> {
    let path = raw.split('\t').next().unwrap_or(raw).trim();
    if path.is_empty() || path == "/dev/null" {
        return None;
    }
    Some(path.strip_prefix(prefix).unwrap_or(path).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Headers
    // -----------------------------------------------------------------------

    #[test]
    fn header_with_counts() {
        let h = parse_hunk_header("@@ -3,4 +3,5 @@").unwrap();
        assert_eq!(
            h,
            HunkHeader { old_start: 3, old_count: 4, new_start: 3, new_count: 5 }
        );
    }

    #[test]
    fn header_counts_default_to_one() {
        let h = parse_hunk_header("@@ -1 +1 @@").unwrap();
        assert_eq!((h.old_count, h.new_count), (1, 1));
    }

    #[test]
    fn header_allows_section_heading() {
        assert!(parse_hunk_header("@@ -10,2 +10,3 @@ ## Usage").is_ok());
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for bad in ["@@", "@@ -1 +1", "@@ -a,1 +1 @@", "@@ 1,1 1,1 @@", "@@ -1,1 +1,1 @@@"] {
            let err = parse_hunk_header(bad).unwrap_err();
            assert!(
                matches!(&err, PatchError::UnsupportedFormat { reason } if reason.contains(bad)),
                "{bad}: {err}"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Bodies
    // -----------------------------------------------------------------------

    #[test]
    fn parses_single_hunk() {
        let text = "--- a/body\n+++ b/body\n@@ -1,2 +1,2 @@\n keep\n-old\n+new\n";
        let patch = parse_unified(text).unwrap();
        assert_eq!(patch.target(), Some("body"));
        assert_eq!(patch.hunks.len(), 1);
        let kinds: Vec<LineKind> = patch.hunks[0].lines.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LineKind::Context, LineKind::Remove, LineKind::Add]);
        assert_eq!(patch.stats(), PatchStats { hunks: 1, added: 1, removed: 1 });
    }

    #[test]
    fn path_without_prefix_and_with_timestamp() {
        let text = "--- body\t2024-01-01\n+++ body\t2024-01-02\n@@ -1 +1 @@\n-a\n+b\n";
        let patch = parse_unified(text).unwrap();
        assert_eq!(patch.target(), Some("body"));
    }

    #[test]
    fn no_newline_marker() {
        let text = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b\n\\ No newline at end of file\n";
        let patch = parse_unified(text).unwrap();
        let lines = &patch.hunks[0].lines;
        assert!(lines[0].no_newline);
        assert!(lines[1].no_newline);
    }

    #[test]
    fn blank_line_counts_as_context() {
        let text = "--- a/f\n+++ b/f\n@@ -1,3 +1,3 @@\n a\n\n-b\n+c\n";
        let patch = parse_unified(text).unwrap();
        assert_eq!(patch.hunks[0].lines[1].kind, LineKind::Context);
        assert_eq!(patch.hunks[0].lines[1].text, "");
    }

    #[test]
    fn short_body_is_rejected() {
        let text = "--- a/f\n+++ b/f\n@@ -1,3 +1,3 @@\n a\n-b\n+c\n";
        let err = parse_unified(text).unwrap_err();
        assert!(matches!(&err, PatchError::UnsupportedFormat { reason } if reason.contains("ends early")));
    }

    #[test]
    fn long_body_is_rejected() {
        let text = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n+b\n+c\n";
        assert!(matches!(parse_unified(text), Err(PatchError::UnsupportedFormat { .. })));
    }

    #[test]
    fn multiple_files_rejected() {
        let text = "--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\n--- a/y\n+++ b/y\n@@ -1 +1 @@\n-a\n+b\n";
        let err = parse_unified(text).unwrap_err();
        assert!(matches!(&err, PatchError::UnsupportedFormat { reason } if reason.contains("more than one file")));
    }

    #[test]
    fn preamble_lines_are_ignored() {
        let text = "diff --git a/f b/f\nindex 123..456 100644\n--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n+b\n";
        assert_eq!(parse_unified(text).unwrap().hunks.len(), 1);
    }

    #[test]
    fn reversed_swaps_sides() {
        let text = "--- a/f\n+++ b/f\n@@ -2,2 +2,3 @@\n keep\n-old\n+new\n+more\n";
        let patch = parse_unified(text).unwrap();
        let back = patch.reversed();
        assert_eq!(
            back.hunks[0].header,
            HunkHeader { old_start: 2, old_count: 3, new_start: 2, new_count: 2 }
        );
        let kinds: Vec<LineKind> = back.hunks[0].lines.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LineKind::Context, LineKind::Add, LineKind::Remove, LineKind::Remove]);
        assert_eq!(back.stats(), PatchStats { hunks: 1, added: 1, removed: 2 });
        assert_eq!(back.reversed(), patch);
    }

    #[test]
    fn no_hunks_rejected() {
        assert!(matches!(
            parse_unified("--- a/f\n+++ b/f\n"),
            Err(PatchError::UnsupportedFormat { .. })
        ));
    }
}
