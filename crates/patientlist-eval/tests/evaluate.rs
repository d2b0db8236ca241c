//! End-to-end evaluation against the in-memory runner

use chrono::NaiveDate;
use patientlist_ast::{Condition, ListDefinition, OrderEntry};
use patientlist_compiler::CompilerOptions;
use patientlist_eval::{
    InMemoryRunner, ListExecutor, PageRequest, QueryKind, ResultRow, record_uuid,
};
use patientlist_model::{FieldRegistry, Patient, PersonName, Visit};
use pretty_assertions::assert_eq;

fn registry() -> FieldRegistry {
    FieldRegistry::builder()
        .with_standard_fields()
        .person_attribute("Bed Number")
        .build()
        .unwrap()
}

fn patient(id: i64, given: &str, family: &str) -> Patient {
    let mut patient = Patient::new(id, format!("patient-{id}"));
    patient.names.push(PersonName {
        given_name: Some(given.into()),
        family_name: Some(family.into()),
        preferred: true,
        ..Default::default()
    });
    patient
}

fn rows() -> Vec<ResultRow> {
    let ann = patient(1, "Ann", "Lee");
    let ben = patient(2, "Ben", "Okafor");
    let start = NaiveDate::from_ymd_opt(2024, 3, 10).and_then(|d| d.and_hms_opt(8, 0, 0));

    let mut first = Visit::new(100, "visit-100", ann.clone());
    first.start_datetime = start;
    let mut second = Visit::new(101, "visit-101", ann);
    second.start_datetime = start;
    let mut third = Visit::new(102, "visit-102", ben);
    third.start_datetime = start;

    vec![
        ResultRow::Visit(first),
        ResultRow::Visit(second),
        ResultRow::Visit(third),
        ResultRow::Patient(patient(3, "Cai", "Zhou")),
    ]
}

fn active_visits() -> ListDefinition {
    ListDefinition::new("list-active", "Active visits")
        .with_condition(Condition::new("patient.hasActiveVisit", "EQUALS", "true"))
        .with_order(OrderEntry::asc("patient.fullName"))
        .with_header_template("{patient.fullName}")
        .with_body_template("visit {visit.startDate}")
}

#[test]
fn pages_visit_rows_with_count() {
    let registry = registry();
    let runner = InMemoryRunner::new(rows());
    let executor = ListExecutor::new(&registry, &runner)
        .with_options(CompilerOptions::new().with_today(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()));

    let page = executor.evaluate(&active_visits(), PageRequest::new(1, 2).with_count());

    assert_eq!(page.total_count, Some(3));
    assert_eq!(page.len(), 2);
    assert!(page.diagnostics.is_empty());
    assert_eq!(page.records[0].header.as_deref(), Some("Ann Lee"));
    assert_eq!(page.records[0].body.as_deref(), Some("visit 2024-03-10 08:00"));

    let second = executor.evaluate(&active_visits(), PageRequest::new(2, 2));
    assert_eq!(second.len(), 1);
    assert_eq!(second.total_count, None);
    assert_eq!(second.records[0].header.as_deref(), Some("Ben Okafor"));
}

#[test]
fn record_identity_ignores_visit() {
    let registry = registry();
    let runner = InMemoryRunner::new(rows());
    let executor = ListExecutor::new(&registry, &runner);

    let page = executor.evaluate(&active_visits(), PageRequest::new(1, 10));

    // Ann has two visits; both rows carry the same identity
    assert_eq!(page.records[0].uuid, page.records[1].uuid);
    assert_ne!(page.records[0].uuid, page.records[2].uuid);
    assert_eq!(page.records[0].uuid, record_uuid("list-active", "patient-1"));
    assert_ne!(
        page.records[0].uuid,
        record_uuid("list-other", "patient-1")
    );
}

#[test]
fn count_and_data_queries_share_predicate() {
    let registry = registry();
    let runner = InMemoryRunner::new(rows());
    let executor = ListExecutor::new(&registry, &runner);
    let list = ListDefinition::new("list-beds", "Beds")
        .with_condition(Condition::new("patient.attr.Bed_Number", "EXISTS", ""))
        .with_order(OrderEntry::desc("patient.age"));

    executor.evaluate(&list, PageRequest::new(1, 10).with_count());

    let queries = runner.queries();
    assert_eq!(queries.len(), 2);
    let (count, data) = (&queries[0], &queries[1]);
    assert_eq!(count.kind, QueryKind::Count);
    assert_eq!(data.kind, QueryKind::Data);
    assert_eq!(count.params, data.params);

    let count_body = count.text.trim_start_matches("select count(p) ");
    let data_body = data.text.trim_start_matches("select p ");
    assert_eq!(data_body, format!("{count_body} order by p.birthdate asc"));
    assert_eq!(data.page, Some(PageRequest::new(1, 10).with_count()));
}

#[test]
fn patient_lists_see_each_patient_once() {
    let registry = registry();
    let runner = InMemoryRunner::new(rows());
    let executor = ListExecutor::new(&registry, &runner);
    let list = ListDefinition::new("list-all", "Everyone")
        .with_condition(Condition::new("patient.familyName", "IS_NOT_NULL", ""))
        .with_header_template("{patient.givenName} {patient.unknownField}");

    let page = executor.evaluate(&list, PageRequest::new(1, 10).with_count());

    assert_eq!(page.total_count, Some(3));
    let headers: Vec<_> = page
        .records
        .iter()
        .filter_map(|record| record.header.clone())
        .collect();
    assert_eq!(
        headers,
        vec![
            "Ann {patient.unknownField}",
            "Ben {patient.unknownField}",
            "Cai {patient.unknownField}",
        ]
    );
    assert!(page.records.iter().all(|record| record.visit.is_none()));
}

#[test]
fn failing_count_returns_empty_page_with_error() {
    let registry = registry();
    let runner = InMemoryRunner::new(rows()).failing_count();
    let executor = ListExecutor::new(&registry, &runner);

    let page = executor.evaluate(&active_visits(), PageRequest::new(1, 10).with_count());

    assert!(page.is_empty());
    assert!(page.diagnostics[0].code.is_execution_error());
    // The data query never ran
    assert_eq!(runner.queries().len(), 1);
}
