//! Compile errors

use patientlist_ast::Operator;
use patientlist_diagnostics::{ErrorCode, PL0002, PL0003, PL0004, PatientListError, Subject};
use thiserror::Error;

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that stop a list definition from compiling
///
/// Unknown fields are not errors: those entries are dropped and reported as diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unknown operator '{token}' in condition #{index} ({field})")]
    UnknownOperator {
        index: usize,
        field: String,
        token: String,
    },

    #[error("Unknown relative date range '{name}' in condition #{index} ({field})")]
    UnknownRelativeRange {
        index: usize,
        field: String,
        name: String,
    },

    #[error("Operator {operator} is not supported for {field} in condition #{index}")]
    UnsupportedOperator {
        index: usize,
        field: String,
        operator: Operator,
    },
}

impl CompileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownOperator { .. } => PL0002,
            Self::UnknownRelativeRange { .. } => PL0003,
            Self::UnsupportedOperator { .. } => PL0004,
        }
    }

    /// The condition that failed
    pub fn subject(&self) -> Subject {
        match self {
            Self::UnknownOperator { index, field, .. }
            | Self::UnknownRelativeRange { index, field, .. }
            | Self::UnsupportedOperator { index, field, .. } => Subject::Condition {
                index: *index,
                field: field.clone(),
            },
        }
    }
}

impl From<CompileError> for PatientListError {
    fn from(err: CompileError) -> Self {
        PatientListError::compile_at(err.code(), err.to_string(), err.subject())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operator_converts() {
        let err = CompileError::UnknownOperator {
            index: 2,
            field: "patient.gender".into(),
            token: "SOUNDS_LIKE".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown operator 'SOUNDS_LIKE' in condition #2 (patient.gender)"
        );

        let converted: PatientListError = err.into();
        assert_eq!(converted.code(), PL0002);
        assert!(converted.code().is_compile_error());
        assert_eq!(
            converted.to_diagnostic().subject,
            Some(Subject::Condition {
                index: 2,
                field: "patient.gender".into()
            })
        );
    }
}
