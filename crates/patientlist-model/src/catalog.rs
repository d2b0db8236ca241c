//! Standard field catalog and default templates

use crate::entity::{PatientIdentifier, PersonAddress, PersonName, RecordView};
use crate::field::{
    AliasKind, DataType, EntityType, FieldCategory, FieldDescriptor, FieldPrefix, MappingPath,
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Header and body templates used when a list defines none
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Templates {
    pub header_template: String,
    pub body_template: String,
}

pub fn default_templates() -> Templates {
    Templates {
        header_template: "{patient.fullName} ({patient.identifier})".to_string(),
        body_template: "{patient.gender}, {patient.age} years, {patient.address1}".to_string(),
    }
}

/// Fields available in every deployment, in catalog order
pub fn standard_fields() -> Vec<FieldDescriptor> {
    let mut fields = vec![
        alias(
            "identifier",
            AliasKind::Identifier,
            "p.identifiers.identifier",
            "Patient identifier",
            |i: &PatientIdentifier| Some(i.identifier.clone()),
        ),
        FieldDescriptor::new(
            FieldPrefix::Patient,
            "fullName",
            DataType::String,
            FieldCategory::Alias(AliasKind::FullName),
            MappingPath::property("p.names.fullName"),
        )
        .with_description("Patient full name")
        .with_extractor(|view| {
            view.patient
                .preferred_name()
                .map(PersonName::full_name)
                .filter(|name| !name.is_empty())
        }),
    ];

    fields.extend([
        name_part("givenName", "Given name", |n| n.given_name.clone()),
        name_part("middleName", "Middle name", |n| n.middle_name.clone()),
        name_part("familyName", "Family name", |n| n.family_name.clone()),
    ]);

    fields.extend([
        FieldDescriptor::new(
            FieldPrefix::Patient,
            "gender",
            DataType::String,
            FieldCategory::Generic,
            MappingPath::property("p.gender"),
        )
        .with_description("Gender")
        .with_extractor(|view| view.patient.gender.clone()),
        FieldDescriptor::new(
            FieldPrefix::Patient,
            "birthdate",
            DataType::Date,
            FieldCategory::Generic,
            MappingPath::property("p.birthdate"),
        )
        .with_description("Birth date")
        .with_extractor(|view| view.patient.birthdate.map(|d| d.format("%Y-%m-%d").to_string())),
        FieldDescriptor::new(
            FieldPrefix::Patient,
            "age",
            DataType::Integer,
            FieldCategory::Age,
            MappingPath::Derived,
        )
        .with_description("Age in years")
        .with_extractor(|view| {
            view.patient
                .age_on(Local::now().date_naive())
                .map(|age| age.to_string())
        }),
    ]);

    fields.extend([
        address_part("address1", "Address line 1", |a| a.address1.clone()),
        address_part("address2", "Address line 2", |a| a.address2.clone()),
        address_part("address3", "Address line 3", |a| a.address3.clone()),
        address_part("cityVillage", "City or village", |a| a.city_village.clone()),
        address_part("stateProvince", "State or province", |a| a.state_province.clone()),
        address_part("country", "Country", |a| a.country.clone()),
        address_part("postalCode", "Postal code", |a| a.postal_code.clone()),
    ]);

    // The flag is a patient field but is answered by the visit row
    fields.push(
        FieldDescriptor::new(
            FieldPrefix::Patient,
            "hasActiveVisit",
            DataType::Boolean,
            FieldCategory::ActiveVisitFlag,
            MappingPath::property("v.stopDatetime"),
        )
        .with_entity(EntityType::Patient)
        .with_description("Has an active visit")
        .with_extractor(|view| view.visit.map(|v| v.is_active().to_string())),
    );

    fields.extend([
        visit_field(
            "startDate",
            DataType::Date,
            "v.startDatetime",
            "Visit start date",
            |view| view.visit.and_then(|v| v.start_datetime).map(format_datetime),
        ),
        visit_field(
            "endDate",
            DataType::Date,
            "v.stopDatetime",
            "Visit end date",
            |view| view.visit.and_then(|v| v.stop_datetime).map(format_datetime),
        ),
        visit_field(
            "visitType",
            DataType::String,
            "v.visitType.name",
            "Visit type",
            |view| view.visit.and_then(|v| v.visit_type.clone()),
        ),
        visit_field(
            "location",
            DataType::String,
            "v.location.name",
            "Visit location",
            |view| view.visit.and_then(|v| v.location.clone()),
        ),
        FieldDescriptor::new(
            FieldPrefix::Visit,
            "hasDiagnosis",
            DataType::Boolean,
            FieldCategory::DiagnosisFlag,
            MappingPath::property("ob.valueCoded"),
        )
        .with_description("Visit has a diagnosis")
        .with_extractor(|view| {
            view.visit
                .map(|v| v.diagnoses.iter().any(|d| !d.voided).to_string())
        }),
        FieldDescriptor::new(
            FieldPrefix::Visit,
            "diagnosis",
            DataType::Coded,
            FieldCategory::Diagnosis,
            MappingPath::property("ob.valueCoded"),
        )
        .with_description("Visit diagnosis")
        .with_extractor(|view| view.visit.and_then(|v| v.diagnosis_summary())),
    ]);

    fields
}

/// Descriptor for a person attribute type, e.g. `Bed Number` as `patient.attr.Bed_Number`
pub fn person_attribute_field(type_name: &str) -> FieldDescriptor {
    let owned = type_name.to_string();
    FieldDescriptor::new(
        FieldPrefix::Patient,
        attribute_field_name(type_name),
        DataType::String,
        FieldCategory::Attribute,
        MappingPath::property("attr.value"),
    )
    .with_description(type_name)
    .with_extractor(move |view| view.patient.attribute(&owned).map(str::to_string))
}

/// Descriptor for a visit attribute type
pub fn visit_attribute_field(type_name: &str) -> FieldDescriptor {
    let owned = type_name.to_string();
    FieldDescriptor::new(
        FieldPrefix::Visit,
        attribute_field_name(type_name),
        DataType::String,
        FieldCategory::Attribute,
        MappingPath::property("vattr.valueReference"),
    )
    .with_description(type_name)
    .with_extractor(move |view| {
        view.visit
            .and_then(|visit| visit.attribute(&owned))
            .map(str::to_string)
    })
}

fn attribute_field_name(type_name: &str) -> String {
    format!(
        "{}{}",
        crate::field::ATTRIBUTE_MARKER,
        type_name.trim().replace(' ', "_")
    )
}

fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

fn alias<T, F>(
    name: &str,
    kind: AliasKind,
    path: &str,
    description: &str,
    read: F,
) -> FieldDescriptor
where
    F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    T: AliasSource + 'static,
{
    FieldDescriptor::new(
        FieldPrefix::Patient,
        name,
        DataType::String,
        FieldCategory::Alias(kind),
        MappingPath::property(path),
    )
    .with_description(description)
    .with_extractor(move |view| T::select(view).and_then(&read))
}

fn name_part(
    name: &str,
    description: &str,
    read: impl Fn(&PersonName) -> Option<String> + Send + Sync + 'static,
) -> FieldDescriptor {
    alias(
        name,
        AliasKind::Name,
        &format!("p.names.{name}"),
        description,
        read,
    )
}

fn address_part(
    name: &str,
    description: &str,
    read: impl Fn(&PersonAddress) -> Option<String> + Send + Sync + 'static,
) -> FieldDescriptor {
    alias(
        name,
        AliasKind::Address,
        &format!("p.addresses.{name}"),
        description,
        read,
    )
}

fn visit_field(
    name: &str,
    data_type: DataType,
    path: &str,
    description: &str,
    read: impl Fn(&RecordView<'_>) -> Option<String> + Send + Sync + 'static,
) -> FieldDescriptor {
    FieldDescriptor::new(
        FieldPrefix::Visit,
        name,
        data_type,
        FieldCategory::Generic,
        MappingPath::property(path),
    )
    .with_description(description)
    .with_extractor(read)
}

/// Patient collection an alias field reads from
trait AliasSource {
    fn select<'a>(view: &RecordView<'a>) -> Option<&'a Self>;
}

impl AliasSource for PersonName {
    fn select<'a>(view: &RecordView<'a>) -> Option<&'a Self> {
        view.patient.preferred_name()
    }
}

impl AliasSource for PersonAddress {
    fn select<'a>(view: &RecordView<'a>) -> Option<&'a Self> {
        view.patient.preferred_address()
    }
}

impl AliasSource for PatientIdentifier {
    fn select<'a>(view: &RecordView<'a>) -> Option<&'a Self> {
        view.patient.preferred_identifier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Patient, PersonAttribute, Visit};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_fields_are_unique() {
        let fields = standard_fields();
        let mut ids: Vec<String> = fields.iter().map(FieldDescriptor::id).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_person_attribute_field() {
        let descriptor = person_attribute_field("Bed Number");
        assert_eq!(descriptor.id(), "patient.attr.Bed_Number");

        let mut patient = Patient::new(1, "p-1");
        patient.attributes.push(PersonAttribute {
            attribute_type: "Bed Number".into(),
            value: "7".into(),
            voided: false,
        });
        assert_eq!(
            descriptor.value(&RecordView::patient(&patient)).as_deref(),
            Some("7")
        );
    }

    #[test]
    fn test_visit_field_without_visit_is_empty() {
        let fields = standard_fields();
        let start = fields
            .iter()
            .find(|f| f.id() == "visit.startDate")
            .unwrap();

        let patient = Patient::new(1, "p-1");
        assert_eq!(start.value(&RecordView::patient(&patient)), None);

        let mut visit = Visit::new(2, "v-2", patient.clone());
        visit.start_datetime = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 30, 0));
        assert_eq!(
            start.value(&RecordView::visit(&visit)).as_deref(),
            Some("2024-03-01 09:30")
        );
    }

    #[test]
    fn test_default_templates_reference_standard_fields() {
        let ids: Vec<String> = standard_fields().iter().map(FieldDescriptor::id).collect();
        let templates = default_templates();
        for id in ["patient.fullName", "patient.identifier", "patient.age"] {
            assert!(ids.contains(&id.to_string()));
            assert!(
                templates.header_template.contains(id) || templates.body_template.contains(id)
            );
        }
    }
}
