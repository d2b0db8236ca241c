//! Patient list compiler
//!
//! Lowers a [`ListDefinition`](patientlist_ast::ListDefinition) into object-query text with
//! positional `?` placeholders and a parameter list in matching order.
//!
//! ```
//! use patientlist_ast::{Condition, ListDefinition, OrderEntry};
//! use patientlist_compiler::Compiler;
//! use patientlist_model::FieldRegistry;
//!
//! let registry = FieldRegistry::builder()
//!     .with_standard_fields()
//!     .person_attribute("Bed Number")
//!     .build()
//!     .unwrap();
//! let list = ListDefinition::new("list-1", "Ward A")
//!     .with_condition(Condition::new("patient.attr.Bed_Number", "EQUALS", "12"))
//!     .with_order(OrderEntry::asc("patient.familyName"));
//!
//! let query = Compiler::new(&registry).compile(&list).unwrap();
//! assert_eq!(query.params.len(), query.placeholder_count());
//! ```

mod compiler;
mod condition;
pub mod emit;
pub mod error;
pub mod join;
pub mod options;
pub mod ordering;
pub mod query;

pub use compiler::{Compiler, compile};
pub use error::{CompileError, CompileResult};
pub use join::{BaseEntity, Join, JoinPlan};
pub use options::{CompilerOptions, DEFAULT_DATE_FORMAT, DIAGNOSIS_CONCEPT_CLASS_UUID};
pub use ordering::SortKey;
pub use query::CompiledQuery;
