//! Error types for the patch crate.

use std::fmt;

use serde::Serialize;

/// Errors that can occur while normalizing or applying a patch.
///
/// Every variant carries enough detail (offending line, expected vs. actual
/// target, mismatching text) for an automated caller to correct itself.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Malformed or disallowed patch syntax.
    #[error("unsupported patch format: {reason}")]
    UnsupportedFormat { reason: String },

    /// The patch names a different field than the caller expected.
    #[error("patch targets {actual:?} but {expected:?} was expected")]
    TargetMismatch { expected: String, actual: String },

    /// Context or line numbers do not match the current text exactly.
    #[error("patch does not apply: hunk {hunk} at line {line}: {reason}")]
    NotApplicable {
        hunk: usize,
        line: usize,
        reason: String,
    },

    /// The patch applied but the text is unchanged.
    #[error("patch applied cleanly but did not change the text")]
    NoOp,
}

impl PatchError {
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_applicable(hunk: usize, line: usize, reason: impl Into<String>) -> Self {
        Self::NotApplicable {
            hunk,
            line,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> PatchErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => PatchErrorKind::UnsupportedFormat,
            Self::TargetMismatch { .. } => PatchErrorKind::PatchTargetMismatch,
            Self::NotApplicable { .. } => PatchErrorKind::PatchNotApplicable,
            Self::NoOp => PatchErrorKind::PatchNoOp,
        }
    }

    /// Only a context mismatch is worth retrying, after re-reading the
    /// current text and regenerating the patch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotApplicable { .. })
    }
}

/// Stable, caller-facing error classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PatchErrorKind {
    UnsupportedFormat,
    PatchTargetMismatch,
    PatchNotApplicable,
    PatchNoOp,
}

impl fmt::Display for PatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat => write!(f, "UnsupportedFormat"),
            Self::PatchTargetMismatch => write!(f, "PatchTargetMismatch"),
            Self::PatchNotApplicable => write!(f, "PatchNotApplicable"),
            Self::PatchNoOp => write!(f, "PatchNoOp"),
        }
    }
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
