//! List records

use md5::{Digest, Md5};
use patientlist_diagnostics::Diagnostic;
use patientlist_model::{Patient, RecordView, Visit};
use serde::Serialize;
use uuid::{Builder, Uuid};

/// Stable identity of a (list, patient) pair
///
/// A version 3 uuid over the MD5 of the list uuid followed by the patient uuid, with no
/// namespace, so the same pair always gets the same identity whichever visit the row came
/// from and existing clients keep their keys.
pub fn record_uuid(list_uuid: &str, patient_uuid: &str) -> Uuid {
    let digest = Md5::new()
        .chain_update(list_uuid.as_bytes())
        .chain_update(patient_uuid.as_bytes())
        .finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    Builder::from_md5_bytes(bytes).into_uuid()
}

/// One entry of an evaluated list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecord {
    pub uuid: Uuid,
    pub patient: Patient,
    pub visit: Option<Visit>,
    pub header: Option<String>,
    pub body: Option<String>,
}

impl ListRecord {
    pub fn view(&self) -> RecordView<'_> {
        RecordView {
            patient: &self.patient,
            visit: self.visit.as_ref(),
        }
    }
}

/// One page of an evaluated list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub records: Vec<ListRecord>,
    /// Total matching rows, when requested
    pub total_count: Option<u64>,
    /// Compile warnings, plus the error that cut the page short if any
    pub diagnostics: Vec<Diagnostic>,
}

impl ListPage {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
