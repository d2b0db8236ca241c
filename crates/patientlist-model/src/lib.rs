//! Patient list data model
//!
//! This crate provides:
//! - Field descriptors and the immutable field registry
//! - The standard field catalog and default templates
//! - Patient and visit records returned by query runners
//! - A sample patient for template previews

pub mod catalog;
pub mod entity;
pub mod field;
pub mod registry;
pub mod sample;

pub use catalog::{Templates, default_templates};
pub use entity::*;
pub use field::*;
pub use registry::*;
pub use sample::*;
