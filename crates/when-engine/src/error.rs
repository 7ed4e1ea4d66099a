//! Error types for when-engine operations.

use thiserror::Error;

/// Why a resolution call failed before any entity could be processed.
///
/// Both kinds surface to the user as the same message; the kind is kept for
/// diagnostics only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The classifier call itself did not succeed.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The classifier answered, but the payload is not shaped like a result.
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WhenError {
    #[error("The time service has returned an error! Please try again later.")]
    Processing(FailureKind),

    /// A well-shaped response contained an entity this crate cannot read.
    /// Indicates a bug on one side of the classifier contract.
    #[error("Malformed entity: {0}")]
    MalformedEntity(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid grain filter: {0}")]
    InvalidGrainFilter(String),
}

impl WhenError {
    pub(crate) fn transport(detail: impl Into<String>) -> Self {
        WhenError::Processing(FailureKind::Transport(detail.into()))
    }

    pub(crate) fn shape(detail: impl Into<String>) -> Self {
        WhenError::Processing(FailureKind::Shape(detail.into()))
    }

    /// The failure kind, if this is a user-facing processing error.
    pub fn failure_kind(&self) -> Option<&FailureKind> {
        match self {
            WhenError::Processing(kind) => Some(kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WhenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_shape_share_user_message() {
        let transport = WhenError::transport("HTTP 503");
        let shape = WhenError::shape("no entities");
        assert_eq!(transport.to_string(), shape.to_string());
        assert!(transport.to_string().contains("try again later"));
    }

    #[test]
    fn test_failure_kind_is_kept_for_diagnostics() {
        let err = WhenError::shape("no entities");
        assert_eq!(
            err.failure_kind(),
            Some(&FailureKind::Shape("no entities".to_string()))
        );
        assert!(WhenError::MalformedEntity("x".into()).failure_kind().is_none());
    }
}
