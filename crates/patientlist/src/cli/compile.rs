//! Compile command implementation

use super::output::{self, KeyValue, OutputFormat};
use super::{RegistryConfig, compiler_options, load_definition};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use patientlist_ast::ParamValue;
use patientlist_compiler::{BaseEntity, CompiledQuery, Compiler};
use patientlist_diagnostics::Diagnostic;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for compile command
pub struct CompileConfig {
    pub file: PathBuf,
    pub registry: RegistryConfig,
    /// Reference date for ages and relative ranges
    pub today: Option<NaiveDate>,
    pub output_format: Option<String>,
    pub output_file: Option<PathBuf>,
}

/// What `compile` prints
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileReport {
    pub base: BaseEntity,
    pub count_query: String,
    pub data_query: String,
    pub parameters: Vec<ParamValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<&CompiledQuery> for CompileReport {
    fn from(query: &CompiledQuery) -> Self {
        Self {
            base: query.base(),
            count_query: query.count_text(),
            data_query: query.data_text(),
            parameters: query.params.clone(),
            diagnostics: query.diagnostics.clone(),
        }
    }
}

impl CompileReport {
    fn rows(&self) -> Vec<KeyValue> {
        let mut rows = vec![
            KeyValue::new("base", self.base.to_string()),
            KeyValue::new("count query", self.count_query.as_str()),
            KeyValue::new("data query", self.data_query.as_str()),
        ];
        rows.extend(
            self.parameters
                .iter()
                .enumerate()
                .map(|(i, param)| KeyValue::new(format!("?{}", i + 1), param.to_string())),
        );
        rows
    }
}

/// Compile a list definition file and print its queries
pub fn compile(config: CompileConfig) -> Result<()> {
    let list = load_definition(&config.file)?;
    let registry = config.registry.build()?;

    let query = Compiler::new(&registry)
        .with_options(compiler_options(config.today))
        .compile(&list)
        .with_context(|| format!("Failed to compile list {}", list.uuid))?;

    output::print_diagnostics(&query.diagnostics);

    let report = CompileReport::from(&query);
    output::print_output(
        &report,
        OutputFormat::parse(config.output_format.as_deref()),
        config.output_file.as_deref(),
        CompileReport::rows,
    )
}
