//! Patient and visit records as returned by the query runner

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: i64,
    pub uuid: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub names: Vec<PersonName>,
    #[serde(default)]
    pub addresses: Vec<PersonAddress>,
    #[serde(default)]
    pub identifiers: Vec<PatientIdentifier>,
    #[serde(default)]
    pub attributes: Vec<PersonAttribute>,
}

impl Patient {
    pub fn new(id: i64, uuid: impl Into<String>) -> Self {
        Self {
            id,
            uuid: uuid.into(),
            gender: None,
            birthdate: None,
            names: Vec::new(),
            addresses: Vec::new(),
            identifiers: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Preferred non-voided name, falling back to the first non-voided one
    pub fn preferred_name(&self) -> Option<&PersonName> {
        preferred(&self.names, |n| n.preferred, |n| n.voided)
    }

    pub fn preferred_address(&self) -> Option<&PersonAddress> {
        preferred(&self.addresses, |a| a.preferred, |a| a.voided)
    }

    pub fn preferred_identifier(&self) -> Option<&PatientIdentifier> {
        preferred(&self.identifiers, |i| i.preferred, |i| i.voided)
    }

    /// Value of the first non-voided attribute of the given type
    pub fn attribute(&self, type_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| !attr.voided && attr.attribute_type.eq_ignore_ascii_case(type_name))
            .map(|attr| attr.value.as_str())
    }

    /// Age in whole years on the given date
    pub fn age_on(&self, date: NaiveDate) -> Option<i32> {
        let birthdate = self.birthdate?;
        let mut years = date.year() - birthdate.year();
        // Birthday not reached yet this year
        if (date.month(), date.day()) < (birthdate.month(), birthdate.day()) {
            years -= 1;
        }
        Some(years)
    }
}

fn preferred<T>(
    items: &[T],
    is_preferred: impl Fn(&T) -> bool,
    is_voided: impl Fn(&T) -> bool,
) -> Option<&T> {
    items
        .iter()
        .find(|item| !is_voided(item) && is_preferred(item))
        .or_else(|| items.iter().find(|item| !is_voided(item)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonName {
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
    pub family_name: Option<String>,
    pub family_name2: Option<String>,
    pub preferred: bool,
    pub voided: bool,
}

impl PersonName {
    /// Given, middle and family names separated by spaces
    pub fn full_name(&self) -> String {
        [&self.given_name, &self.middle_name, &self.family_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonAddress {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city_village: Option<String>,
    pub state_province: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub preferred: bool,
    pub voided: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientIdentifier {
    pub identifier: String,
    pub identifier_type: Option<String>,
    pub preferred: bool,
    pub voided: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonAttribute {
    pub attribute_type: String,
    pub value: String,
    pub voided: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: i64,
    pub uuid: String,
    pub patient: Patient,
    #[serde(default)]
    pub visit_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_datetime: Option<NaiveDateTime>,
    #[serde(default)]
    pub stop_datetime: Option<NaiveDateTime>,
    #[serde(default)]
    pub attributes: Vec<VisitAttribute>,
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
}

impl Visit {
    pub fn new(id: i64, uuid: impl Into<String>, patient: Patient) -> Self {
        Self {
            id,
            uuid: uuid.into(),
            patient,
            visit_type: None,
            location: None,
            start_datetime: None,
            stop_datetime: None,
            attributes: Vec::new(),
            diagnoses: Vec::new(),
        }
    }

    /// Started and not yet stopped
    pub fn is_active(&self) -> bool {
        self.start_datetime.is_some() && self.stop_datetime.is_none()
    }

    pub fn attribute(&self, type_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| !attr.voided && attr.attribute_type.eq_ignore_ascii_case(type_name))
            .map(|attr| attr.value_reference.as_str())
    }

    /// Non-voided diagnoses joined with `, `
    pub fn diagnosis_summary(&self) -> Option<String> {
        let labels: Vec<String> = self
            .diagnoses
            .iter()
            .filter(|diagnosis| !diagnosis.voided)
            .filter_map(Diagnosis::label)
            .collect();
        (!labels.is_empty()).then(|| labels.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitAttribute {
    pub attribute_type: String,
    pub value_reference: String,
    pub voided: bool,
}

/// Diagnosis observation recorded during one of the visit's encounters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Diagnosis {
    /// Coded concept, when the diagnosis is coded
    pub concept_id: Option<i64>,
    /// Concept name or free text
    pub text: Option<String>,
    pub voided: bool,
}

impl Diagnosis {
    fn label(&self) -> Option<String> {
        match (&self.text, self.concept_id) {
            (Some(text), _) if !text.trim().is_empty() => Some(text.clone()),
            (_, Some(id)) => Some(id.to_string()),
            _ => None,
        }
    }
}

/// Borrowed view of one result row, as seen by value extractors
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    pub patient: &'a Patient,
    pub visit: Option<&'a Visit>,
}

impl<'a> RecordView<'a> {
    pub fn patient(patient: &'a Patient) -> Self {
        Self {
            patient,
            visit: None,
        }
    }

    pub fn visit(visit: &'a Visit) -> Self {
        Self {
            patient: &visit.patient,
            visit: Some(visit),
        }
    }
}
