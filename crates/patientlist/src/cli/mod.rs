//! CLI functionality for the patient list tool
//!
//! One module per subcommand, plus output formatting and the helpers they share for loading
//! list definitions and building the field registry.

pub mod compile;
pub mod fields;
pub mod output;
pub mod run;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use patientlist_ast::ListDefinition;
use patientlist_compiler::CompilerOptions;
use patientlist_model::FieldRegistry;
use std::fs;
use std::path::Path;

/// Deployment-specific attribute types to register next to the standard fields
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    pub person_attributes: Vec<String>,
    pub visit_attributes: Vec<String>,
}

impl RegistryConfig {
    pub fn build(&self) -> Result<FieldRegistry> {
        FieldRegistry::builder()
            .with_standard_fields()
            .person_attributes(self.person_attributes.iter().cloned())
            .visit_attributes(self.visit_attributes.iter().cloned())
            .build()
            .context("Failed to build the field registry")
    }
}

/// Read a list definition from a JSON file
pub fn load_definition(path: &Path) -> Result<ListDefinition> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read list definition: {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse list definition: {}", path.display()))
}

pub fn compiler_options(today: Option<NaiveDate>) -> CompilerOptions {
    match today {
        Some(today) => CompilerOptions::new().with_today(today),
        None => CompilerOptions::new(),
    }
}
