//! Header and body templates
//!
//! Templates contain `{fieldId}` placeholders, e.g. `{patient.fullName} ({patient.identifier})`.

use patientlist_model::{FieldRegistry, RecordView};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z][A-Za-z0-9_.]*)\}"));

/// Renders templates against one record
pub trait TemplateRenderer {
    fn render(&self, template: &str, view: &RecordView<'_>) -> String;
}

/// Resolves placeholders through the value extractors of a [`FieldRegistry`]
///
/// Placeholders naming unknown fields are left as written. Known fields without a value
/// render as empty text.
#[derive(Debug, Clone, Copy)]
pub struct FieldTemplateRenderer<'r> {
    registry: &'r FieldRegistry,
}

impl<'r> FieldTemplateRenderer<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self { registry }
    }
}

impl TemplateRenderer for FieldTemplateRenderer<'_> {
    fn render(&self, template: &str, view: &RecordView<'_>) -> String {
        let regex = match PLACEHOLDER.as_ref() {
            Ok(regex) => regex,
            Err(err) => {
                log::error!("Template placeholder pattern failed to compile: {err}");
                return template.to_string();
            }
        };

        regex
            .replace_all(template, |caps: &Captures<'_>| {
                let field_id = &caps[1];
                match self.registry.lookup(field_id) {
                    Some(descriptor) => descriptor.value(view).unwrap_or_default(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patientlist_model::{Patient, Visit, sample_patient};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn registry() -> FieldRegistry {
        FieldRegistry::builder()
            .with_standard_fields()
            .person_attribute("Bed Number")
            .build()
            .unwrap()
    }

    #[rstest]
    #[case("{patient.fullName} ({patient.identifier})", "Joe Blow Doe (4564)")]
    #[case("Bed: {patient.attr.Bed_Number}", "Bed: TEST BED NUMBER")]
    #[case("{patient.shoeSize} stays", "{patient.shoeSize} stays")]
    #[case("visit: [{visit.startDate}]", "visit: []")]
    #[case("no placeholders", "no placeholders")]
    #[case("{ patient.gender }", "{ patient.gender }")]
    fn test_render_sample(#[case] template: &str, #[case] expected: &str) {
        let registry = registry();
        let patient = sample_patient(&registry);
        let renderer = FieldTemplateRenderer::new(&registry);

        assert_eq!(
            renderer.render(template, &RecordView::patient(&patient)),
            expected
        );
    }

    #[test]
    fn test_render_visit_fields() {
        let registry = registry();
        let mut visit = Visit::new(1, "v-1", Patient::new(1, "p-1"));
        visit.visit_type = Some("Outpatient".into());
        visit.location = Some("Ward A".into());

        let renderer = FieldTemplateRenderer::new(&registry);
        assert_eq!(
            renderer.render("{visit.visitType} @ {visit.location}", &RecordView::visit(&visit)),
            "Outpatient @ Ward A"
        );
    }
}
