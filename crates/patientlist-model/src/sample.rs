//! Sample patient for previewing templates without querying the store

use crate::entity::{Patient, PatientIdentifier, PersonAddress, PersonAttribute, PersonName};
use crate::field::FieldPrefix;
use crate::registry::FieldRegistry;
use chrono::NaiveDate;

pub const SAMPLE_IDENTIFIER: &str = "4564";

/// Joe Blow Doe, born 1990-01-01, with a `TEST <NAME>` value for every person attribute
/// registered in `registry`
pub fn sample_patient(registry: &FieldRegistry) -> Patient {
    let mut patient = Patient::new(1, "00000000-0000-0000-0000-000000000001");
    patient.gender = Some("M".to_string());
    patient.birthdate = NaiveDate::from_ymd_opt(1990, 1, 1);

    patient.names.push(PersonName {
        given_name: Some("Joe".to_string()),
        middle_name: Some("Blow".to_string()),
        family_name: Some("Doe".to_string()),
        family_name2: Some("Moe".to_string()),
        preferred: true,
        voided: false,
    });
    patient.addresses.push(PersonAddress {
        address1: Some("Address 1".to_string()),
        address2: Some("Address 2".to_string()),
        address3: Some("Address 3".to_string()),
        preferred: true,
        ..Default::default()
    });
    patient.identifiers.push(PatientIdentifier {
        identifier: SAMPLE_IDENTIFIER.to_string(),
        preferred: true,
        ..Default::default()
    });

    patient.attributes = registry
        .attribute_types(FieldPrefix::Patient)
        .into_iter()
        .map(|type_name| PersonAttribute {
            value: format!("TEST {}", type_name.to_uppercase()),
            attribute_type: type_name,
            voided: false,
        })
        .collect();

    patient
}
