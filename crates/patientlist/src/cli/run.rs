//! Run command implementation

use super::output::{self, OutputFormat};
use super::{RegistryConfig, compiler_options, load_definition};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use patientlist_eval::{InMemoryRunner, ListExecutor, ListPage, ListRecord, PageRequest, ResultRow};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::Tabled;

/// Configuration for run command
pub struct RunConfig {
    pub file: PathBuf,
    /// JSON array of patient and visit rows standing in for the store
    pub data: PathBuf,
    pub page: usize,
    pub page_size: usize,
    pub count: bool,
    pub registry: RegistryConfig,
    pub today: Option<NaiveDate>,
    pub output_format: Option<String>,
    pub output_file: Option<PathBuf>,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Visit")]
    visit: String,
    #[tabled(rename = "Header")]
    header: String,
    #[tabled(rename = "Body")]
    body: String,
}

impl From<&ListRecord> for RecordRow {
    fn from(record: &ListRecord) -> Self {
        Self {
            patient: record.patient.uuid.clone(),
            visit: record
                .visit
                .as_ref()
                .map(|visit| visit.uuid.clone())
                .unwrap_or_default(),
            header: record.header.clone().unwrap_or_default(),
            body: record.body.clone().unwrap_or_default(),
        }
    }
}

/// Read result rows from a JSON file
pub fn load_rows(path: &Path) -> Result<Vec<ResultRow>> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse data file: {}", path.display()))
}

/// Evaluate one page of a list against in-memory rows
pub fn evaluate(config: &RunConfig) -> Result<ListPage> {
    let list = load_definition(&config.file)?;
    let registry = config.registry.build()?;
    let runner = InMemoryRunner::new(load_rows(&config.data)?);

    let mut request = PageRequest::new(config.page, config.page_size);
    if config.count {
        request = request.with_count();
    }

    let executor =
        ListExecutor::new(&registry, &runner).with_options(compiler_options(config.today));
    Ok(executor.evaluate(&list, request))
}

/// Evaluate a list and print the page
pub fn run(config: RunConfig) -> Result<()> {
    if config.page == 0 || config.page_size == 0 {
        anyhow::bail!("Page and page size must be at least 1");
    }

    let page = evaluate(&config)?;
    output::print_diagnostics(&page.diagnostics);

    let format = OutputFormat::parse(config.output_format.as_deref());
    if let (OutputFormat::Table, Some(total)) = (format, page.total_count) {
        eprintln!("Total records: {total}");
    }
    output::print_output(&page, format, config.output_file.as_deref(), |page| {
        page.records.iter().map(RecordRow::from).collect()
    })?;

    if output::has_errors(&page.diagnostics) {
        anyhow::bail!("List evaluation failed");
    }
    Ok(())
}
