//! Patient list diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the patient list crates:
//! structured error codes, severities, and the diagnostics reported when a list definition
//! compiles with dropped entries.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for patient list operations
pub type Result<T> = std::result::Result<T, PatientListError>;
