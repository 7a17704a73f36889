use thiserror::Error;

use crate::parse::PathError;

/// Failures of the typed extraction layer.
///
/// `NotFound` is the only recoverable kind: callers reading an optional field
/// convert it to "absent" via [`OptionalExt::optional`]. Everything else
/// aborts the build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    #[error("value not found at '{path}'")]
    NotFound { path: String },

    #[error("type mismatch at '{path}': wanted {wanted}, got {got}")]
    TypeMismatch {
        wanted: String,
        got: String,
        path: String,
    },

    #[error("too many elements: expected {expected}, found [{}]", candidates.join(", "))]
    TooManyElements {
        candidates: Vec<String>,
        expected: usize,
    },

    #[error(transparent)]
    InvalidPath(#[from] PathError),
}

impl ReadError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReadError::NotFound { .. })
    }

    pub(crate) fn not_found(path: impl ToString) -> Self {
        ReadError::NotFound {
            path: path.to_string(),
        }
    }

    pub(crate) fn mismatch(wanted: impl Into<String>, got: &str, path: impl ToString) -> Self {
        ReadError::TypeMismatch {
            wanted: wanted.into(),
            got: got.to_owned(),
            path: path.to_string(),
        }
    }
}

/// Converts a `NotFound` read into `Ok(None)` for optional fields.
pub trait OptionalExt<T> {
    /// # Errors
    ///
    /// Propagates every error except [`ReadError::NotFound`].
    fn optional(self) -> Result<Option<T>, ReadError>;
}

impl<T> OptionalExt<T> for Result<T, ReadError> {
    fn optional(self) -> Result<Option<T>, ReadError> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// A broken invariant of the system itself rather than bad input: an
/// unregistered rule format, or a format profile that disagrees with the
/// shape of the configuration schema it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("unknown rule format '{version}'")]
    UnknownRuleFormat { version: String },

    #[error("flatten target '{path}' is not a list (got {got})")]
    FlattenTargetNotSequence { path: String, got: String },

    #[error("flatten target '{path}' has {len} elements; at most one is allowed")]
    FlattenTooManyElements { path: String, len: usize },
}

/// Errors that abort building a rule tree. No partial document is produced.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("field '{field}' is not allowed in {rule_kind} rule")]
    FieldNotAllowed {
        field: &'static str,
        rule_kind: RuleKind,
    },

    #[error("child rule is using rule format '{child}', expected '{parent}'")]
    FormatMismatch { child: String, parent: String },

    #[error("child rule {index} is not a valid rule snapshot: {source}")]
    InvalidChild {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl BuildError {
    /// `true` when the failure indicates a misconfigured system (format
    /// registry or profile) rather than malformed input.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, BuildError::Invariant(_))
    }
}

/// Errors raised while assembling a [`FormatRegistry`](super::FormatRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("duplicate rule format '{version}'")]
    DuplicateFormat { version: String },

    #[error("rule format version must not be empty")]
    EmptyVersion,

    #[error("invalid rule format registry document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whether a rule is the root (`default`) rule or a nested child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Default,
    Child,
}

impl RuleKind {
    /// The reserved name of the root rule.
    pub const DEFAULT_NAME: &'static str = "default";

    #[must_use]
    pub fn of(name: &str) -> Self {
        if name == Self::DEFAULT_NAME {
            RuleKind::Default
        } else {
            RuleKind::Child
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleKind::Default => write!(f, "default"),
            RuleKind::Child => write!(f, "non-default"),
        }
    }
}
