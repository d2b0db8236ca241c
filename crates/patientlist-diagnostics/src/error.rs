//! Patient list error types

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - the list cannot be evaluated
    Error,
    /// Warning - an entry was skipped but evaluation continues
    Warning,
    /// Information - informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// The list definition entry a diagnostic refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Subject {
    /// A filter condition, by position in the definition
    Condition { index: usize, field: String },
    /// An order entry, by position in the definition
    OrderEntry { index: usize, field: String },
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Condition { index, field } => write!(f, "condition #{index} ({field})"),
            Subject::OrderEntry { index, field } => write!(f, "order entry #{index} ({field})"),
        }
    }
}

/// A diagnostic message with the entry it concerns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Entry of the list definition
    pub subject: Option<Subject>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            subject: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            subject: None,
            help: code.info().help.map(str::to_string),
        }
    }

    /// Set the subject
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn to_colored_string(&self) -> String {
        use colored::Colorize;

        let label = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().cyan().bold(),
        };
        let mut out = format!("{label}[{}]: {}", self.code, self.message);
        if let Some(subject) = &self.subject {
            out.push_str(&format!("\n  {} {subject}", "-->".blue()));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {help}", "help:".green()));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(subject) = &self.subject {
            write!(f, " at {}", subject)?;
        }
        Ok(())
    }
}

/// Main patient list error type
#[derive(Debug, Clone, Error)]
pub enum PatientListError {
    /// Compile error (conditions, ordering, operators)
    #[error("{code}: {message}")]
    Compile {
        code: ErrorCode,
        message: String,
        subject: Option<Subject>,
    },

    /// Model error (field registry)
    #[error("{code}: {message}")]
    Model { code: ErrorCode, message: String },

    /// Execution error (query runner, record assembly)
    #[error("{code}: {message}")]
    Execution { code: ErrorCode, message: String },
}

impl PatientListError {
    /// Create a compile error
    pub fn compile(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Compile {
            code,
            message: message.into(),
            subject: None,
        }
    }

    /// Create a compile error pointing at a list entry
    pub fn compile_at(code: ErrorCode, message: impl Into<String>, subject: Subject) -> Self {
        Self::Compile {
            code,
            message: message.into(),
            subject: Some(subject),
        }
    }

    /// Create a model error
    pub fn model(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Model {
            code,
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Execution {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Compile { code, .. }
            | Self::Model { code, .. }
            | Self::Execution { code, .. } => *code,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Compile {
                code,
                message,
                subject,
            } => {
                let mut diag = Diagnostic::error(*code, message.clone());
                if let Some(subject) = subject {
                    diag = diag.with_subject(subject.clone());
                }
                if let Some(help) = code.info().help {
                    diag = diag.with_help(help);
                }
                diag
            }
            Self::Model { code, message } | Self::Execution { code, message } => {
                Diagnostic::error(*code, message.clone())
            }
        }
    }
}
