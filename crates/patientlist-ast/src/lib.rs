//! Patient list syntax definitions
//!
//! This crate defines the declarative side of a patient list: the list definition with its
//! conditions and ordering, the operator vocabulary, relative date ranges, and the predicate
//! tree that the compiler lowers conditions into before emitting query text.

mod definition;
mod operator;
mod predicate;
mod relative;
mod value;

pub use definition::*;
pub use operator::*;
pub use predicate::*;
pub use relative::*;
pub use value::*;
