use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid field kind: {0}")]
    InvalidFieldKind(String),

    #[error("invalid revision tag: {0:?}")]
    InvalidTag(String),

    #[error("unknown field {field:?} for document kind {kind:?}")]
    UnknownField { kind: String, field: String },

    #[error("duplicate field {0:?} in schema")]
    DuplicateField(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
