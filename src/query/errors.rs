//! Canonicalization error types
//!
//! Error codes:
//! - STRATA_QUERY_INVALID (REJECT)
//! - STRATA_QUERY_UNSUPPORTED_OPERATOR (REJECT)

use std::fmt;

/// Query-layer error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed filter document
    StrataQueryInvalid,
    /// Operator the canonicalizer does not understand
    StrataQueryUnsupportedOperator,
}

impl QueryErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::StrataQueryInvalid => "STRATA_QUERY_INVALID",
            QueryErrorCode::StrataQueryUnsupportedOperator => "STRATA_QUERY_UNSUPPORTED_OPERATOR",
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Canonicalization error with context
#[derive(Debug, Clone)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
}

impl QueryError {
    /// Create an invalid-filter error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::StrataQueryInvalid,
            message: reason.into(),
        }
    }

    /// Create an unsupported-operator error
    pub fn unsupported_operator(name: &str) -> Self {
        Self {
            code: QueryErrorCode::StrataQueryUnsupportedOperator,
            message: format!("unsupported operator '{}'", name),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REJECT] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for QueryError {}

/// Result type for canonicalization
pub type QueryResult<T> = Result<T, QueryError>;
