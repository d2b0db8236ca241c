//! Patient list evaluation
//!
//! This crate runs compiled lists through a [`QueryRunner`], assembles the result rows into
//! [`ListRecord`]s with stable identities, and renders their header and body templates.

mod error;
mod executor;
mod record;
mod runner;
mod template;

pub use error::{RunnerError, RunnerResult};
pub use executor::ListExecutor;
pub use record::{ListPage, ListRecord, record_uuid};
pub use runner::{
    InMemoryRunner, PageRequest, QueryKind, QueryRunner, RecordedQuery, ResultRow, RowIter,
};
pub use template::{FieldTemplateRenderer, TemplateRenderer};
