//! CLI commands driven through their config structs

use patientlist::cli::RegistryConfig;
use patientlist::cli::compile::{CompileConfig, compile};
use patientlist::cli::fields::{FieldsConfig, fields};
use patientlist::cli::run::{RunConfig, evaluate, run};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, value.to_string()).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn bed_registry() -> RegistryConfig {
    RegistryConfig {
        person_attributes: vec!["Bed Number".into()],
        visit_attributes: Vec::new(),
    }
}

fn list_json() -> Value {
    json!({
        "uuid": "list-ward",
        "name": "Ward",
        "patientListConditions": [
            {"field": "patient.hasActiveVisit", "operator": "EQUALS", "value": "true"},
            {"field": "patient.attr.Bed_Number", "operator": "EXISTS"}
        ],
        "ordering": [
            {"field": "patient.familyName", "sortOrder": "asc"}
        ],
        "headerTemplate": "{patient.fullName}",
        "bodyTemplate": "Bed {patient.attr.Bed_Number}"
    })
}

fn rows_json() -> Value {
    json!([
        {
            "type": "visit",
            "id": 10,
            "uuid": "v-10",
            "patient": {
                "id": 1,
                "uuid": "p-1",
                "names": [{"givenName": "Ann", "familyName": "Lee", "preferred": true}],
                "attributes": [{"attributeType": "Bed Number", "value": "12"}]
            }
        },
        {
            "type": "visit",
            "id": 11,
            "uuid": "v-11",
            "patient": {"id": 2, "uuid": "p-2"}
        }
    ])
}

#[test]
fn compile_writes_queries_and_parameters() {
    let dir = TempDir::new().unwrap();
    let file = write_json(dir.path(), "list.json", &list_json());
    let out = dir.path().join("query.json");

    compile(CompileConfig {
        file,
        registry: bed_registry(),
        today: None,
        output_format: Some("json".into()),
        output_file: Some(out.clone()),
    })
    .unwrap();

    let report = read_json(&out);
    assert_eq!(report["base"], "Visit");
    let data = report["dataQuery"].as_str().unwrap();
    assert!(data.starts_with("select v from Visit v inner join v.patient as p"));
    assert!(data.ends_with("order by pnames.familyName asc"));
    let count = report["countQuery"].as_str().unwrap();
    assert_eq!(
        count.matches('?').count(),
        report["parameters"].as_array().unwrap().len()
    );
}

#[test]
fn compile_fails_on_unknown_operator() {
    let dir = TempDir::new().unwrap();
    let file = write_json(
        dir.path(),
        "list.json",
        &json!({
            "uuid": "list-bad",
            "name": "Bad",
            "patientListConditions": [
                {"field": "patient.gender", "operator": "ROUGHLY", "value": "F"}
            ]
        }),
    );

    let err = compile(CompileConfig {
        file,
        registry: RegistryConfig::default(),
        today: None,
        output_format: None,
        output_file: Some(dir.path().join("never.json")),
    })
    .unwrap_err();

    assert!(format!("{err:#}").contains("list-bad"));
    assert!(!dir.path().join("never.json").exists());
}

#[test]
fn run_renders_page_with_count() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig {
        file: write_json(dir.path(), "list.json", &list_json()),
        data: write_json(dir.path(), "rows.json", &rows_json()),
        page: 1,
        page_size: 1,
        count: true,
        registry: bed_registry(),
        today: None,
        output_format: Some("json".into()),
        output_file: Some(dir.path().join("page.json")),
    };

    let page = evaluate(&config).unwrap();
    assert_eq!(page.total_count, Some(2));
    assert_eq!(page.len(), 1);
    assert_eq!(page.records[0].header.as_deref(), Some("Ann Lee"));
    assert_eq!(page.records[0].body.as_deref(), Some("Bed 12"));

    run(config).unwrap();
    let written = read_json(&dir.path().join("page.json"));
    assert_eq!(written["totalCount"], 2);
    assert_eq!(written["records"][0]["patient"]["uuid"], "p-1");
}

#[test]
fn run_rejects_page_zero() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig {
        file: write_json(dir.path(), "list.json", &list_json()),
        data: write_json(dir.path(), "rows.json", &rows_json()),
        page: 0,
        page_size: 10,
        count: false,
        registry: bed_registry(),
        today: None,
        output_format: None,
        output_file: None,
    };

    assert!(run(config).is_err());
}

#[test]
fn fields_lists_registered_attributes() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("fields.json");

    fields(FieldsConfig {
        registry: bed_registry(),
        templates: false,
        preview: false,
        header: None,
        body: None,
        output_format: Some("json".into()),
        output_file: Some(out.clone()),
    })
    .unwrap();

    let catalog = read_json(&out);
    let ids: Vec<_> = catalog
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["field"].as_str())
        .collect();
    assert_eq!(ids.first(), Some(&"patient.identifier"));
    assert!(ids.contains(&"patient.attr.Bed_Number"));
}

#[test]
fn fields_preview_uses_sample_patient() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("preview.json");

    fields(FieldsConfig {
        registry: bed_registry(),
        templates: false,
        preview: true,
        header: Some("{patient.attr.Bed_Number}".into()),
        body: None,
        output_format: Some("json".into()),
        output_file: Some(out.clone()),
    })
    .unwrap();

    let preview = read_json(&out);
    assert_eq!(preview["header"], "TEST BED NUMBER");
}
