//! Fields command implementation

use super::RegistryConfig;
use super::output::{self, KeyValue, OutputFormat};
use anyhow::Result;
use patientlist_eval::{FieldTemplateRenderer, TemplateRenderer};
use patientlist_model::{FieldRegistry, FieldSummary, RecordView, Templates, sample_patient};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Configuration for fields command
pub struct FieldsConfig {
    pub registry: RegistryConfig,
    /// Print the default templates instead of the catalog
    pub templates: bool,
    /// Render templates against the sample patient
    pub preview: bool,
    pub header: Option<String>,
    pub body: Option<String>,
    pub output_format: Option<String>,
    pub output_file: Option<PathBuf>,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Type")]
    data_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&FieldSummary> for FieldRow {
    fn from(summary: &FieldSummary) -> Self {
        Self {
            field: summary.field.clone(),
            data_type: summary.data_type.to_string(),
            description: summary.description.clone(),
        }
    }
}

/// Header and body as rendered for the sample patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreview {
    pub header: String,
    pub body: String,
}

/// List the field catalog, the default templates, or a rendered preview
pub fn fields(config: FieldsConfig) -> Result<()> {
    let registry = config.registry.build()?;
    let format = OutputFormat::parse(config.output_format.as_deref());
    let output_file = config.output_file.as_deref();

    if config.preview {
        let templates = templates_with_overrides(&registry, config.header, config.body);
        let rendered = preview(&registry, &templates);
        return output::print_output(&rendered, format, output_file, |p| {
            vec![
                KeyValue::new("header", p.header.as_str()),
                KeyValue::new("body", p.body.as_str()),
            ]
        });
    }

    if config.templates {
        let templates = registry.default_templates();
        return output::print_output(&templates, format, output_file, |t| {
            vec![
                KeyValue::new("headerTemplate", t.header_template.as_str()),
                KeyValue::new("bodyTemplate", t.body_template.as_str()),
            ]
        });
    }

    let catalog = registry.catalog();
    log::debug!("Listing {} field(s)", catalog.len());
    output::print_output(catalog.as_slice(), format, output_file, |entries| {
        entries.iter().map(FieldRow::from).collect()
    })
}

fn templates_with_overrides(
    registry: &FieldRegistry,
    header: Option<String>,
    body: Option<String>,
) -> Templates {
    let defaults = registry.default_templates();
    Templates {
        header_template: header.unwrap_or(defaults.header_template),
        body_template: body.unwrap_or(defaults.body_template),
    }
}

/// Render `templates` for the sample patient
pub fn preview(registry: &FieldRegistry, templates: &Templates) -> TemplatePreview {
    let patient = sample_patient(registry);
    let view = RecordView::patient(&patient);
    let renderer = FieldTemplateRenderer::new(registry);
    TemplatePreview {
        header: renderer.render(&templates.header_template, &view),
        body: renderer.render(&templates.body_template, &view),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preview_default_templates() {
        let registry = FieldRegistry::standard();
        let rendered = preview(&registry, &registry.default_templates());

        assert_eq!(rendered.header, "Joe Blow Doe (4564)");
        assert!(rendered.body.starts_with("M, "));
        assert!(rendered.body.ends_with(" years, Address 1"));
    }

    #[test]
    fn test_template_overrides() {
        let registry = FieldRegistry::standard();
        let templates = templates_with_overrides(&registry, None, Some("{patient.gender}".into()));

        assert_eq!(templates.header_template, registry.default_templates().header_template);
        assert_eq!(preview(&registry, &templates).body, "M");
    }
}
