//! Patient list error codes following a structured numbering system
//!
//! Error code ranges:
//! - PL0001-PL0099: Compile errors (conditions, ordering, operators)
//! - PL0100-PL0199: Model errors (field registry, catalog)
//! - PL0200-PL0299: Execution errors (query runner, record assembly)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    pub const fn is_compile_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    pub const fn is_model_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    pub const fn is_execution_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PL{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Compile errors (0001-0099)
    map.insert(
        1,
        ErrorInfo::new("Unknown field").with_help("The entry was dropped from the list"),
    );
    map.insert(
        2,
        ErrorInfo::new("Unknown operator")
            .with_help("Operators are not defaulted; fix the operator token of the condition"),
    );
    map.insert(3, ErrorInfo::new("Unknown relative date range"));
    map.insert(4, ErrorInfo::new("Operator not supported for field"));
    map.insert(5, ErrorInfo::new("Field has no query mapping"));
    map.insert(6, ErrorInfo::new("Invalid date value"));

    // Model errors (0100-0199)
    map.insert(100, ErrorInfo::new("Duplicate field identifier"));
    map.insert(101, ErrorInfo::new("Invalid attribute type name"));

    // Execution errors (0200-0299)
    map.insert(200, ErrorInfo::new("Query execution failed"));
    map.insert(201, ErrorInfo::new("Count query failed"));
    map.insert(202, ErrorInfo::new("Row materialization failed"));

    map
});

// Compile errors
pub const PL0001: ErrorCode = ErrorCode::new(1);
pub const PL0002: ErrorCode = ErrorCode::new(2);
pub const PL0003: ErrorCode = ErrorCode::new(3);
pub const PL0004: ErrorCode = ErrorCode::new(4);
pub const PL0005: ErrorCode = ErrorCode::new(5);
pub const PL0006: ErrorCode = ErrorCode::new(6);

// Model errors
pub const PL0100: ErrorCode = ErrorCode::new(100);
pub const PL0101: ErrorCode = ErrorCode::new(101);

// Execution errors
pub const PL0200: ErrorCode = ErrorCode::new(200);
pub const PL0201: ErrorCode = ErrorCode::new(201);
pub const PL0202: ErrorCode = ErrorCode::new(202);
