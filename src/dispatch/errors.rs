//! Dispatch error types
//!
//! Error codes:
//! - STRATA_DISPATCH_BAD_VALUE (REJECT)
//! - STRATA_DISPATCH_INTERNAL (FATAL)
//!
//! Validation failures (tailable misuse, planner errors, zero
//! solutions, distinct positional misuse) are REJECT. Broken internal
//! invariants (a solution the stage builder cannot build) are FATAL.

use std::fmt;

use crate::exec::StageBuildError;
use crate::query::QueryError;

/// Severity levels for dispatch errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// System must halt immediately
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Dispatch-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorCode {
    /// Invalid query/option combination or planner rejection
    StrataDispatchBadValue,
    /// Broken internal invariant
    StrataDispatchInternal,
}

impl DispatchErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DispatchErrorCode::StrataDispatchBadValue => "STRATA_DISPATCH_BAD_VALUE",
            DispatchErrorCode::StrataDispatchInternal => "STRATA_DISPATCH_INTERNAL",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            DispatchErrorCode::StrataDispatchBadValue => Severity::Reject,
            DispatchErrorCode::StrataDispatchInternal => Severity::Fatal,
        }
    }
}

impl fmt::Display for DispatchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Dispatch error with context
#[derive(Debug)]
pub struct DispatchError {
    code: DispatchErrorCode,
    message: String,
}

impl DispatchError {
    /// Create a bad-value error
    pub fn bad_value(message: impl Into<String>) -> Self {
        Self {
            code: DispatchErrorCode::StrataDispatchBadValue,
            message: message.into(),
        }
    }

    /// Create an internal (fatal) error
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: DispatchErrorCode::StrataDispatchInternal,
            message: message.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DispatchErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for DispatchError {}

impl From<QueryError> for DispatchError {
    fn from(err: QueryError) -> Self {
        DispatchError::bad_value(err.to_string())
    }
}

impl From<StageBuildError> for DispatchError {
    fn from(err: StageBuildError) -> Self {
        DispatchError::internal(err.to_string())
    }
}

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DispatchErrorCode::StrataDispatchBadValue.code(),
            "STRATA_DISPATCH_BAD_VALUE"
        );
        assert_eq!(
            DispatchErrorCode::StrataDispatchInternal.code(),
            "STRATA_DISPATCH_INTERNAL"
        );
    }

    #[test]
    fn test_bad_value_rejects() {
        let err = DispatchError::bad_value("tailable cursor requested on non capped collection");
        assert!(!err.is_fatal());
        assert_eq!(err.severity(), Severity::Reject);
    }

    #[test]
    fn test_internal_is_fatal() {
        let err = DispatchError::internal("stage builder refused a planner solution");
        assert!(err.is_fatal());
    }

    #[test]
    fn test_stage_build_failures_are_fatal() {
        let err: DispatchError = StageBuildError::Internal("boom".into()).into();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = DispatchError::bad_value("No query solutions");
        let display = format!("{}", err);
        assert!(display.contains("STRATA_DISPATCH_BAD_VALUE"));
        assert!(display.contains("REJECT"));
        assert!(display.contains("No query solutions"));
    }
}
