//! Execution errors

use patientlist_compiler::CompileError;
use patientlist_diagnostics::{ErrorCode, PL0200, PL0201, PL0202, PatientListError};
use thiserror::Error;

/// Result type for runner operations
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors raised while running a compiled list
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// The list definition did not compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The data query failed
    #[error("Query failed: {0}")]
    Query(String),

    /// The count query failed
    #[error("Count query failed: {0}")]
    Count(String),

    /// A result row could not be turned into a record
    #[error("Row {index} could not be materialized: {message}")]
    Row { index: usize, message: String },
}

impl RunnerError {
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    pub fn count(message: impl Into<String>) -> Self {
        Self::Count(message.into())
    }

    pub fn row(index: usize, message: impl Into<String>) -> Self {
        Self::Row {
            index,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Compile(err) => err.code(),
            Self::Query(_) => PL0200,
            Self::Count(_) => PL0201,
            Self::Row { .. } => PL0202,
        }
    }
}

impl From<RunnerError> for PatientListError {
    fn from(err: RunnerError) -> Self {
        match err {
            RunnerError::Compile(err) => err.into(),
            other => PatientListError::execution(other.code(), other.to_string()),
        }
    }
}
