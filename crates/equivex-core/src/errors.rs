use crate::scope::AssertionFailure;
use std::fmt;
use thiserror::Error;

/// Result type alias using EquivexError
pub type Result<T> = std::result::Result<T, EquivexError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used by the logging facility and by
/// callers that want to branch on the class of failure without matching on
/// message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Usage
    InvalidInput,
    EmptyCollection,
    InvalidConfiguration,
    InvalidMapping,
    NoMembers,
    UnsupportedComparison,

    // Conversion into the value model
    Serialization,

    // Structural mismatch surfaced by a self-wrapping entry point
    AssertionFailed,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::EmptyCollection => "ERR_EMPTY_COLLECTION",
            ExErrorKind::InvalidConfiguration => "ERR_INVALID_CONFIGURATION",
            ExErrorKind::InvalidMapping => "ERR_INVALID_MAPPING",
            ExErrorKind::NoMembers => "ERR_NO_MEMBERS",
            ExErrorKind::UnsupportedComparison => "ERR_UNSUPPORTED_COMPARISON",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::AssertionFailed => "ERR_ASSERTION_FAILED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical error with context, emitted by `log_op_error!`
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the graph path the error was raised at
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== Usage errors ==========

/// Errors raised for API misuse, plus the aggregated mismatch surfaced by
/// the self-wrapping entry points.
///
/// Ordinary structural mismatches never travel through this type while a
/// comparison is running; they are recorded on the
/// [`AssertionScope`](crate::scope::AssertionScope).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquivexError {
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Cannot verify against an empty collection of predicates")]
    EmptyPredicates,

    #[error("Cannot verify against an empty collection of inspectors")]
    EmptyInspectors,

    #[error("Cannot match predicates against an empty collection")]
    EmptyElements,

    #[error("No members were found for comparison of {type_name} at {path}. Please specify some members to include in the comparison or choose a more meaningful assertion.")]
    NoMembersFound { type_name: String, path: String },

    #[error("Cannot compare {subject} with {expectation} at {path}: no step handles this pair")]
    UnsupportedComparison {
        subject: String,
        expectation: String,
        path: String,
    },

    #[error("Cannot map {expectation_path} to {subject_path}: {reason}")]
    InvalidMapping {
        expectation_path: String,
        subject_path: String,
        reason: String,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Cannot convert into a comparable value: {message}")]
    Serialization { message: String },

    #[error("{0}")]
    Mismatch(AssertionFailure),
}

impl EquivexError {
    /// The canonical kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            EquivexError::InvalidArgument { .. } => ExErrorKind::InvalidInput,
            EquivexError::EmptyPredicates
            | EquivexError::EmptyInspectors
            | EquivexError::EmptyElements => ExErrorKind::EmptyCollection,
            EquivexError::NoMembersFound { .. } => ExErrorKind::NoMembers,
            EquivexError::UnsupportedComparison { .. } => ExErrorKind::UnsupportedComparison,
            EquivexError::InvalidMapping { .. } => ExErrorKind::InvalidMapping,
            EquivexError::InvalidConfiguration { .. } => ExErrorKind::InvalidConfiguration,
            EquivexError::Serialization { .. } => ExErrorKind::Serialization,
            EquivexError::Mismatch(_) => ExErrorKind::AssertionFailed,
        }
    }

    /// The aggregated failure, when this error reports a mismatch
    pub fn failure(&self) -> Option<&AssertionFailure> {
        match self {
            EquivexError::Mismatch(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, EquivexError::Mismatch(_))
    }
}

impl From<AssertionFailure> for EquivexError {
    fn from(failure: AssertionFailure) -> Self {
        EquivexError::Mismatch(failure)
    }
}

impl serde::ser::Error for EquivexError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        EquivexError::Serialization {
            message: msg.to_string(),
        }
    }
}

impl From<EquivexError> for ExError {
    fn from(err: EquivexError) -> Self {
        let kind = err.kind();
        match err {
            EquivexError::NoMembersFound { ref path, .. }
            | EquivexError::UnsupportedComparison { ref path, .. } => {
                let path = path.clone();
                ExError::new(kind)
                    .with_path(path)
                    .with_message(err.to_string())
            }
            EquivexError::InvalidMapping {
                ref expectation_path,
                ..
            } => {
                let path = expectation_path.clone();
                ExError::new(kind)
                    .with_op("with_mapping")
                    .with_path(path)
                    .with_message(err.to_string())
            }
            EquivexError::Mismatch(ref failure) => ExError::new(kind)
                .with_message(format!("{} failure(s) recorded", failure.failures().len())),
            other => ExError::new(kind).with_message(other.to_string()),
        }
    }
}
