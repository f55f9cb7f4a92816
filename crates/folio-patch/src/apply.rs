//! Zero-fuzz patch application.
//!
//! Every hunk must land exactly where its header says, every context and
//! removed line must match the current text byte for byte, and the whole
//! patch succeeds or nothing changes. A patch whose result is already present
//! in the text is reported as a no-op rather than a mismatch.

use tracing::{debug, warn};

use crate::dialect::{PatchDialect, PatchOptions};
use crate::error::{PatchError, PatchResult};
use crate::hunk::{parse_unified, LineKind, ParsedPatch};
use crate::normalize::normalize_patch;

/// A line of text with its terminator recorded separately.
#[derive(Clone, Copy, Debug)]
struct Line<'a> {
    text: &'a str,
    newline: bool,
}

impl<'a> Line<'a> {
    /// Text compared against patch lines; a CR before the LF is not content.
    fn content(&self) -> &'a str {
        self.text.strip_suffix('\r').unwrap_or(self.text)
    }
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.split_inclusive('\n')
        .map(|piece| match piece.strip_suffix('\n') {
            Some(text) => Line { text, newline: true },
            None => Line { text: piece, newline: false },
        })
        .collect()
}

fn join_lines(lines: &[Line<'_>]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.text.len() + 1).sum());
    let last = lines.len().saturating_sub(1);
    for (i, line) in lines.iter().enumerate() {
        out.push_str(line.text);
        if line.newline || i != last {
            out.push('\n');
        }
    }
    out
}

/// Normalize `patch` in `dialect`, then apply it to `current`.
///
/// Fails with `NoOp` when the patch applies but leaves the text unchanged, or
/// when it does not apply because `current` is already its result. Patches
/// with a deletion-only hunk are never reported as already applied.
pub fn apply_patch(
    current: &str,
    patch: &str,
    dialect: PatchDialect,
    options: &PatchOptions,
) -> PatchResult<String> {
    let normalized = normalize_patch(patch, dialect, options)?;
    let parsed = parse_unified(&normalized)?;
    let result = match apply_parsed(current, &parsed) {
        Ok(result) => result,
        Err(err @ PatchError::NotApplicable { .. }) => {
            if already_applied(current, &parsed) {
                warn!(target_field = ?parsed.target(), "patch is already applied");
                return Err(PatchError::NoOp);
            }
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    if result == current {
        warn!(target_field = ?parsed.target(), "patch produced no change");
        return Err(PatchError::NoOp);
    }

    let stats = parsed.stats();
    debug!(
        target_field = ?parsed.target(),
        hunks = stats.hunks,
        added = stats.added,
        removed = stats.removed,
        "patch applied"
    );
    Ok(result)
}

/// Apply already-parsed hunks to `current` with exact placement.
///
/// Hunks must be ordered and non-overlapping, and each hunk's new-side start
/// must agree with the line delta accumulated by the hunks before it.
pub fn apply_parsed(current: &str, patch: &ParsedPatch) -> PatchResult<String> {
    let source = split_lines(current);
    let mut out: Vec<Line<'_>> = Vec::with_capacity(source.len());
    let mut cursor = 0usize;
    let mut delta: isize = 0;

    for (idx, hunk) in patch.hunks.iter().enumerate() {
        let number = idx + 1;
        let h = hunk.header;

        let start = if h.old_count == 0 {
            h.old_start
        } else {
            h.old_start.checked_sub(1).ok_or_else(|| {
                PatchError::not_applicable(number, 0, "old range starts at line 0 but is not empty")
            })?
        };
        if start < cursor {
            return Err(PatchError::not_applicable(
                number,
                h.old_start,
                "hunk overlaps or precedes the previous hunk",
            ));
        }
        if start > source.len() {
            return Err(PatchError::not_applicable(
                number,
                h.old_start,
                format!("hunk starts past the end of the text ({} lines)", source.len()),
            ));
        }

        let new_index = start as isize + delta;
        let expected_new_start = if h.new_count == 0 { new_index } else { new_index + 1 };
        if h.new_start as isize != expected_new_start {
            return Err(PatchError::not_applicable(
                number,
                h.old_start,
                format!(
                    "new range starts at line {} but line {} was expected",
                    h.new_start, expected_new_start
                ),
            ));
        }

        out.extend_from_slice(&source[cursor..start]);
        let mut pos = start;
        for line in &hunk.lines {
            match line.kind {
                LineKind::Context | LineKind::Remove => {
                    let Some(found) = source.get(pos) else {
                        return Err(PatchError::not_applicable(
                            number,
                            pos + 1,
                            format!("expected {:?} but the text ends", line.text),
                        ));
                    };
                    if found.content() != line.text {
                        return Err(PatchError::not_applicable(
                            number,
                            pos + 1,
                            format!("expected {:?}, found {:?}", line.text, found.content()),
                        ));
                    }
                    if line.kind == LineKind::Context {
                        out.push(*found);
                    }
                    pos += 1;
                }
                LineKind::Add => out.push(Line {
                    text: &line.text,
                    newline: !line.no_newline,
                }),
            }
        }

        cursor = pos;
        delta += h.new_count as isize - h.old_count as isize;
    }

    out.extend_from_slice(&source[cursor..]);
    Ok(join_lines(&out))
}

/// Whether `current` is exactly what `patch` produces: undoing the patch
/// succeeds and redoing it gives back `current`.
///
/// Every hunk must add at least one line. A hunk that only removes lines
/// leaves nothing in the result to recognise it by.
fn already_applied(current: &str, patch: &ParsedPatch) -> bool {
    if patch.hunks.iter().any(|hunk| hunk.added() == 0) {
        return false;
    }
    let Ok(original) = apply_parsed(current, &patch.reversed()) else {
        return false;
    };
    apply_parsed(&original, patch).is_ok_and(|redone| redone == current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_diff::build_text_diff;
    use proptest::prelude::*;

    fn unified(patch: &str) -> PatchResult<String> {
        apply_patch_to("", patch)
    }

    fn apply_patch_to(current: &str, patch: &str) -> PatchResult<String> {
        apply_patch(current, patch, PatchDialect::Unified, &PatchOptions::new())
    }

    // -----------------------------------------------------------------------
    // Application
    // -----------------------------------------------------------------------

    #[test]
    fn replaces_single_line() {
        let patch = "--- a/body\n+++ b/body\n@@ -1 +1 @@\n-Hello old world\n+Hello new world\n";
        let result = apply_patch_to("Hello old world\n", patch).unwrap();
        assert_eq!(result, "Hello new world\n");
    }

    #[test]
    fn second_application_is_noop() {
        let patch = "--- a/f\n+++ b/f\n@@ -1,1 +1,1 @@\n-Hello old world\n+Hello new world\n";
        let once = apply_patch_to("Hello old world\n", patch).unwrap();
        assert_eq!(once, "Hello new world\n");
        assert_eq!(apply_patch_to(&once, patch).unwrap_err(), PatchError::NoOp);
    }

    #[test]
    fn unrelated_text_is_not_applicable() {
        let patch = "--- a/f\n+++ b/f\n@@ -1,1 +1,1 @@\n-Hello old world\n+Hello new world\n";
        let err = apply_patch_to("Goodbye world\n", patch).unwrap_err();
        assert!(matches!(err, PatchError::NotApplicable { hunk: 1, line: 1, .. }));
    }

    #[test]
    fn reapplied_deletion_is_not_applicable() {
        let patch = "--- a/f\n+++ b/f\n@@ -1,3 +1,2 @@\n a\n-b\n c\n";
        let once = apply_patch_to("a\nb\nc\n", patch).unwrap();
        assert_eq!(once, "a\nc\n");
        assert!(matches!(
            apply_patch_to(&once, patch),
            Err(PatchError::NotApplicable { hunk: 1, .. })
        ));
    }

    #[test]
    fn deleting_absent_line_is_not_applicable() {
        let err = apply_patch_to("a\nX\n", "@@ -2 +1,0 @@\n-b\n").unwrap_err();
        assert!(matches!(err, PatchError::NotApplicable { .. }), "{err:?}");
    }

    #[test]
    fn deleting_past_end_is_not_applicable() {
        let err = apply_patch_to("a\n", "@@ -9 +8,0 @@\n-gone\n").unwrap_err();
        assert!(matches!(err, PatchError::NotApplicable { .. }), "{err:?}");
    }

    #[test]
    fn deletion_with_matching_context_is_not_applicable() {
        let err = apply_patch_to("a\nc\n", "@@ -1,2 +1,1 @@\n a\n-b\n").unwrap_err();
        assert!(matches!(err, PatchError::NotApplicable { .. }), "{err:?}");
    }

    #[test]
    fn partially_applied_patch_is_not_applicable() {
        // First hunk's result is in place, second hunk's is not.
        let patch = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-x\n+b\n@@ -2 +2 @@\n-y\n+c\n";
        let err = apply_patch_to("b\ny\n", patch).unwrap_err();
        assert!(matches!(err, PatchError::NotApplicable { hunk: 1, .. }), "{err:?}");
    }

    #[test]
    fn identity_patch_is_noop() {
        let patch = "--- a/body\n+++ b/body\n@@ -1 +1 @@\n-same\n+same\n";
        assert_eq!(apply_patch_to("same\n", patch).unwrap_err(), PatchError::NoOp);
    }

    #[test]
    fn multiple_hunks_with_delta() {
        let base: String = (1..=12).map(|i| format!("line {i}\n")).collect();
        let patch = "--- a/f\n+++ b/f\n\
                     @@ -2,2 +2,3 @@\n line 2\n+inserted\n line 3\n\
                     @@ -10,2 +11,1 @@\n-line 10\n line 11\n";
        let result = apply_patch_to(&base, patch).unwrap();
        let expected: String = (1..=12)
            .filter(|&i| i != 10)
            .flat_map(|i| {
                let mut v = vec![format!("line {i}\n")];
                if i == 2 {
                    v.push("inserted\n".to_string());
                }
                v
            })
            .collect();
        assert_eq!(result, expected);
    }

    #[test]
    fn wrong_new_start_is_rejected() {
        let base: String = (1..=12).map(|i| format!("line {i}\n")).collect();
        let patch = "--- a/f\n+++ b/f\n\
                     @@ -2,2 +2,3 @@\n line 2\n+inserted\n line 3\n\
                     @@ -10,2 +10,1 @@\n-line 10\n line 11\n";
        let err = apply_patch_to(&base, patch).unwrap_err();
        assert!(matches!(err, PatchError::NotApplicable { hunk: 2, .. }));
    }

    #[test]
    fn context_mismatch_reports_expected_and_found() {
        let patch = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n alpha\n-beta\n+gamma\n";
        let err = apply_patch_to("alpha\nBETA\n", patch).unwrap_err();
        match err {
            PatchError::NotApplicable { hunk, line, reason } => {
                assert_eq!((hunk, line), (1, 2));
                assert!(reason.contains("\"beta\""));
                assert!(reason.contains("\"BETA\""));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn no_fuzz_for_shifted_context() {
        // Same content one line lower than the header claims.
        let patch = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-target\n+changed\n";
        let err = apply_patch_to("preamble\ntarget\n", patch).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn overlapping_hunks_rejected() {
        let patch = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n a\n-b\n+c\n@@ -2 +2 @@\n-b\n+d\n";
        let err = apply_patch_to("a\nb\n", patch).unwrap_err();
        assert!(matches!(err, PatchError::NotApplicable { hunk: 2, .. }));
    }

    #[test]
    fn start_past_end_rejected() {
        let patch = "--- a/f\n+++ b/f\n@@ -9 +9 @@\n-a\n+b\n";
        assert!(matches!(
            apply_patch_to("a\n", patch),
            Err(PatchError::NotApplicable { hunk: 1, line: 9, .. })
        ));
    }

    #[test]
    fn insert_into_empty_text() {
        let result = unified("@@ -0,0 +1,2 @@\n+first\n+second\n").unwrap();
        assert_eq!(result, "first\nsecond\n");
    }

    #[test]
    fn delete_everything() {
        let patch = "--- a/f\n+++ b/f\n@@ -1,2 +0,0 @@\n-a\n-b\n";
        assert_eq!(apply_patch_to("a\nb\n", patch).unwrap(), "");
    }

    #[test]
    fn preserves_missing_trailing_newline_in_untouched_tail() {
        let patch = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n+z\n";
        assert_eq!(apply_patch_to("a\nb\nc", patch).unwrap(), "z\nb\nc");
    }

    #[test]
    fn honours_no_newline_marker() {
        let patch = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-a\n+b\n\\ No newline at end of file\n";
        assert_eq!(apply_patch_to("a\n", patch).unwrap(), "b");
    }

    #[test]
    fn crlf_text_matches_context() {
        let patch = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n keep\n-old\n+new\n";
        assert_eq!(apply_patch_to("keep\r\nold\r\n", patch).unwrap(), "keep\r\nnew\n");
    }

    // -----------------------------------------------------------------------
    // Codex dialect
    // -----------------------------------------------------------------------

    #[test]
    fn codex_patch_applies() {
        let patch = "*** Begin Patch\n*** Update File: body\n@@ -1 +1 @@\n-Hello old world\n+Hello new world\n*** End Patch\n";
        let opts = PatchOptions::new().expecting_field("body");
        let result = apply_patch("Hello old world\n", patch, PatchDialect::Codex, &opts).unwrap();
        assert_eq!(result, "Hello new world\n");
    }

    #[test]
    fn codex_add_file_rejected() {
        let patch = "*** Begin Patch\n*** Add File: body\n+Hello\n*** End Patch\n";
        let err = apply_patch("", patch, PatchDialect::Codex, &PatchOptions::new()).unwrap_err();
        assert!(matches!(err, PatchError::UnsupportedFormat { .. }));
        assert!(!err.is_retryable());
    }

    // -----------------------------------------------------------------------
    // Agreement with the text diff builder
    // -----------------------------------------------------------------------

    fn arb_text() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-d]{0,3}", 1..24).prop_map(|lines| {
            lines.into_iter().map(|l| format!("{l}\n")).collect()
        })
    }

    proptest! {
        #[test]
        fn applying_generated_diff_reproduces_target(old in arb_text(), new in arb_text()) {
            prop_assume!(old != new);
            let diff = build_text_diff("body", &old, &new);
            let result = apply_patch_to(&old, &diff.unified_diff).unwrap();
            prop_assert_eq!(&result, &new);

            let normalized = normalize_patch(&diff.unified_diff, PatchDialect::Unified, &PatchOptions::new()).unwrap();
            let stats = parse_unified(&normalized).unwrap().stats();
            prop_assert_eq!(stats.added, diff.added_lines);
            prop_assert_eq!(stats.removed, diff.removed_lines);
        }

        #[test]
        fn generated_diff_is_recognised_on_its_result(old in arb_text(), new in arb_text()) {
            prop_assume!(old != new);
            let diff = build_text_diff("body", &old, &new);
            let normalized = normalize_patch(&diff.unified_diff, PatchDialect::Unified, &PatchOptions::new()).unwrap();
            let parsed = parse_unified(&normalized).unwrap();
            let every_hunk_adds = parsed.hunks.iter().all(|h| h.added() > 0);
            prop_assert_eq!(already_applied(&new, &parsed), every_hunk_adds);
        }

        #[test]
        fn generated_diff_on_unrelated_text_is_not_applicable(
            old in arb_text(),
            new in arb_text(),
            other in arb_unrelated_text(),
        ) {
            prop_assume!(old != new);
            let diff = build_text_diff("body", &old, &new);
            let err = apply_patch_to(&other, &diff.unified_diff).unwrap_err();
            prop_assert!(matches!(err, PatchError::NotApplicable { .. }), "{:?}", err);
        }
    }

    /// Lines that never occur in `arb_text`.
    fn arb_unrelated_text() -> impl Strategy<Value = String> {
        prop::collection::vec("[e-h]{1,3}", 1..24).prop_map(|lines| {
            lines.into_iter().map(|l| format!("{l}\n")).collect()
        })
    }
}
