//! Patient list queries for Rust
//!
//! A patient list is a named, user-defined filter over patients or their visits. This crate
//! bundles the pieces needed to work with one:
//! - The list definition model ([`ast`])
//! - The field registry and record entities ([`model`])
//! - Lowering to parameterized query text ([`compiler`])
//! - Paged evaluation and template rendering ([`eval`])
//!
//! # Example
//!
//! ```
//! use patientlist::{Condition, FieldRegistry, ListDefinition, compile};
//!
//! let registry = FieldRegistry::standard();
//! let list = ListDefinition::new("list-1", "Women")
//!     .with_condition(Condition::new("patient.gender", "EQUALS", "F"));
//!
//! let query = compile(&registry, &list).unwrap();
//! assert_eq!(
//!     query.count_text(),
//!     "select count(p) from Patient p where (p.gender = ?)"
//! );
//! ```

pub use patientlist_ast as ast;
pub use patientlist_compiler as compiler;
pub use patientlist_diagnostics as diagnostics;
pub use patientlist_eval as eval;
pub use patientlist_model as model;

// Convenience re-exports
pub use patientlist_ast::{Condition, ListDefinition, OrderEntry, SortDirection};
pub use patientlist_compiler::{CompiledQuery, Compiler, CompilerOptions, compile};
pub use patientlist_diagnostics::{Diagnostic, PatientListError, Result};
pub use patientlist_eval::{ListExecutor, ListPage, ListRecord, PageRequest, QueryRunner};
pub use patientlist_model::FieldRegistry;

#[cfg(feature = "cli")]
pub mod cli;
