//! Integration tests for list compilation

use chrono::NaiveDate;
use patientlist_ast::{Condition, ListDefinition, OrderEntry, ParamValue};
use patientlist_compiler::{BaseEntity, CompileError, Compiler, CompilerOptions, SortKey};
use patientlist_diagnostics::{PL0001, PL0002, PL0005, Severity, Subject};
use patientlist_model::{
    DataType, FieldCategory, FieldDescriptor, FieldPrefix, FieldRegistry, MappingPath,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn registry() -> FieldRegistry {
    FieldRegistry::builder()
        .with_standard_fields()
        .person_attribute("Bed Number")
        .person_attribute("Ward")
        .visit_attribute("Admission Type")
        .build()
        .unwrap()
}

fn compiler(registry: &FieldRegistry) -> Compiler<'_> {
    Compiler::new(registry).with_options(CompilerOptions::new().with_today(date(2024, 3, 14)))
}

fn list(conditions: &[(&str, &str, &str)]) -> ListDefinition {
    conditions
        .iter()
        .fold(ListDefinition::new("list-1", "Test"), |list, (f, o, v)| {
            list.with_condition(Condition::new(*f, *o, *v))
        })
}

#[rstest]
#[case(&[("patient.attr.Bed_Number", "EQUALS", "12")])]
#[case(&[("patient.fullName", "CONTAINS", "doe"), ("patient.age", "BETWEEN", "18|65")])]
#[case(&[
    ("visit.hasDiagnosis", "EQUALS", "true"),
    ("visit.diagnosis", "EQUALS", "5089"),
    ("visit.startDate", "RELATIVE", "THIS_WEEK"),
    ("patient.gender", "IS_NOT_NULL", ""),
])]
#[case(&[
    ("patient.attr.Bed_Number", "EXISTS", ""),
    ("patient.attr.Ward", "NOT_EQUALS", "B"),
    ("visit.attr.Admission_Type", "CONTAINS", "emerg"),
    ("patient.birthdate", "BETWEEN", "1990-01-01|bad"),
])]
fn placeholders_match_parameters(#[case] conditions: &[(&str, &str, &str)]) {
    let registry = registry();
    let query = compiler(&registry).compile(&list(conditions)).unwrap();

    assert_eq!(query.placeholder_count(), query.params.len());
    assert_eq!(query.data_text().matches('?').count(), query.params.len());
    assert_eq!(query.count_text().matches('?').count(), query.params.len());
}

#[test]
fn unknown_field_is_dropped() {
    let registry = registry();
    let compiler = compiler(&registry);

    let alone = compiler
        .compile(&list(&[("patient.gender", "EQUALS", "F")]))
        .unwrap();
    let interleaved = compiler
        .compile(
            &list(&[
                ("patient.shoeSize", "EQUALS", "44"),
                ("patient.gender", "EQUALS", "F"),
            ])
            .with_order(OrderEntry::asc("patient.favouriteColour")),
        )
        .unwrap();

    assert_eq!(interleaved.data_text(), alone.data_text());
    assert_eq!(interleaved.params, alone.params);

    assert_eq!(interleaved.diagnostics.len(), 2);
    assert!(
        interleaved
            .diagnostics
            .iter()
            .all(|d| d.code == PL0001 && d.severity == Severity::Warning)
    );
    assert_eq!(
        interleaved.diagnostics[0].subject,
        Some(Subject::Condition {
            index: 0,
            field: "patient.shoeSize".into()
        })
    );
}

#[test]
fn derived_field_condition_is_dropped() {
    let registry = FieldRegistry::builder()
        .with_standard_fields()
        .field(FieldDescriptor::new(
            FieldPrefix::Patient,
            "bmi",
            DataType::Integer,
            FieldCategory::Generic,
            MappingPath::Derived,
        ))
        .build()
        .unwrap();
    let compiler = compiler(&registry);

    let alone = compiler
        .compile(&list(&[("patient.gender", "EQUALS", "F")]))
        .unwrap();
    let interleaved = compiler
        .compile(&list(&[
            ("patient.bmi", "GREATER", "30"),
            ("patient.gender", "EQUALS", "F"),
        ]))
        .unwrap();

    assert_eq!(interleaved.data_text(), alone.data_text());
    assert_eq!(interleaved.params, alone.params);

    assert_eq!(interleaved.diagnostics.len(), 1);
    let warning = &interleaved.diagnostics[0];
    assert_eq!(warning.code, PL0005);
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(
        warning.subject,
        Some(Subject::Condition {
            index: 0,
            field: "patient.bmi".into()
        })
    );
}

#[test]
fn age_equals_is_one_year_window() {
    let registry = registry();
    let query = compiler(&registry)
        .compile(&list(&[("patient.age", "EQUALS", "30")]))
        .unwrap();

    assert_eq!(
        query.data_text(),
        "select p from Patient p where (p.birthdate BETWEEN ? AND ?)"
    );
    let earlier = query.params[0].as_date().unwrap();
    let later = query.params[1].as_date().unwrap();
    assert_eq!(later, date(1994, 3, 14));
    assert_eq!(earlier, date(1993, 3, 14));
}

#[test]
fn full_name_order_keeps_direction() {
    let registry = registry();
    let query = compiler(&registry)
        .compile(&ListDefinition::new("list-1", "Test").with_order(OrderEntry::desc("patient.fullName")))
        .unwrap();

    assert_eq!(
        query.data_text(),
        "select p from Patient p inner join p.names as pnames \
         order by pnames.givenName desc, pnames.familyName desc"
    );
}

#[test]
fn birthdate_order_is_inverted_without_touching_the_definition() {
    let registry = registry();
    let definition =
        ListDefinition::new("list-1", "Test").with_order(OrderEntry::asc("patient.birthdate"));
    let before = definition.clone();

    let query = compiler(&registry).compile(&definition).unwrap();

    assert_eq!(
        query.order_by,
        vec![SortKey::new("p.birthdate", patientlist_ast::SortDirection::Descending)]
    );
    assert_eq!(definition, before);
}

#[test]
fn attribute_binds_type_name_then_value() {
    let registry = registry();
    let query = compiler(&registry)
        .compile(&list(&[("patient.attr.Bed_Number", "EQUALS", "12")]))
        .unwrap();

    assert_eq!(
        query.params,
        vec![ParamValue::text("Bed Number"), ParamValue::text("12")]
    );
    assert_eq!(
        query.data_text(),
        "select p from Patient p \
         inner join p.attributes as attr inner join attr.attributeType as attrType \
         where ((attrType.name = ? AND attr.voided != true AND attr.value = ?))"
    );
}

#[test]
fn count_query_shares_joins_and_predicate() {
    let registry = registry();
    let definition = list(&[
        ("visit.diagnosis", "CONTAINS", "malaria"),
        ("patient.familyName", "EQUALS", "Doe"),
    ])
    .with_order(OrderEntry::desc("visit.startDate"))
    .with_order(OrderEntry::asc("patient.identifier"));

    let query = compiler(&registry).compile(&definition).unwrap();
    let count = query.count_text();
    let data = query.data_text();

    assert!(count.starts_with("select count(v) "));
    assert!(data.starts_with("select v "));
    assert_eq!(count.trim_start_matches("select count(v) "), query.body());
    assert_eq!(
        data.trim_start_matches("select v "),
        format!(
            "{} order by v.startDatetime desc, pidentifiers.identifier asc",
            query.body()
        )
    );
    assert!(!count.contains("order by"));
    // The identifier join comes from the ordering alone
    assert!(count.contains("inner join p.identifiers as pidentifiers"));
}

#[rstest]
#[case("visit.startDate")]
#[case("patient.gender")]
#[case("patient.attr.Ward")]
#[case("patient.familyName")]
fn relative_always_binds_two_dates(#[case] field: &str) {
    let registry = registry();
    let query = compiler(&registry)
        .compile(&list(&[(field, "RELATIVE", "THIS_YEAR")]))
        .unwrap();

    let dates: Vec<_> = query
        .params
        .iter()
        .filter_map(ParamValue::as_date)
        .collect();
    assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 12, 31)]);
    assert!(query.predicate.unwrap().contains("BETWEEN ? AND ?"));
}

#[test]
fn consecutive_attributes_are_joined_by_or() {
    let registry = registry();
    let query = compiler(&registry)
        .compile(&list(&[
            ("patient.attr.Bed_Number", "EQUALS", "12"),
            ("patient.attr.Ward", "EQUALS", "B"),
            ("patient.gender", "EQUALS", "F"),
        ]))
        .unwrap();

    assert_eq!(
        query.predicate.as_deref(),
        Some(
            "((attrType.name = ? AND attr.voided != true AND attr.value = ?) \
             OR (attrType.name = ? AND attr.voided != true AND attr.value = ?) \
             AND p.gender = ?)"
        )
    );
}

#[test]
fn active_visit_keeps_attributes_conjunctive() {
    let registry = registry();
    let query = compiler(&registry)
        .compile(&list(&[
            ("patient.hasActiveVisit", "EQUALS", "true"),
            ("patient.attr.Bed_Number", "EXISTS", ""),
            ("patient.attr.Ward", "EQUALS", "B"),
        ]))
        .unwrap();

    assert_eq!(query.base(), BaseEntity::Visit);
    let predicate = query.predicate.unwrap();
    assert!(!predicate.contains(" OR "));
    assert!(predicate.starts_with("((v.startDatetime is not null AND v.stopDatetime is null) AND "));
}

#[test]
fn unknown_operator_fails_compile() {
    let registry = registry();
    let err = compiler(&registry)
        .compile(&list(&[
            ("patient.gender", "EQUALS", "F"),
            ("patient.familyName", "STARTS_WITH", "D"),
        ]))
        .unwrap_err();

    assert_eq!(err.code(), PL0002);
    assert!(matches!(err, CompileError::UnknownOperator { index: 1, .. }));
}

#[test]
fn empty_list_selects_everyone() {
    let registry = registry();
    let query = compiler(&registry)
        .compile(&ListDefinition::new("list-1", "Everyone"))
        .unwrap();

    assert_eq!(query.count_text(), "select count(p) from Patient p");
    assert_eq!(query.data_text(), "select p from Patient p");
    assert!(query.params.is_empty());
}

#[test]
fn compiles_json_definition() {
    let json = r#"{
        "uuid": "b1d3a3c4-0000-4000-8000-000000000001",
        "name": "Inpatients",
        "patientListConditions": [
            {"field": "patient.hasActiveVisit", "operator": "EQUALS", "value": "true"},
            {"field": "visit.attr.Admission_Type", "operator": "EQUALS", "value": "Inpatient"}
        ],
        "ordering": [{"field": "patient.age", "sortOrder": "desc"}]
    }"#;
    let definition: ListDefinition = serde_json::from_str(json).unwrap();

    let registry = registry();
    let query = compiler(&registry).compile(&definition).unwrap();

    assert_eq!(
        query.data_text(),
        "select v from Visit v inner join v.patient as p \
         inner join v.attributes as vattr inner join vattr.attributeType as vattrType \
         where ((v.startDatetime is not null AND v.stopDatetime is null) \
         AND (vattrType.name = ? AND vattr.voided != true AND vattr.valueReference = ?)) \
         order by p.birthdate asc"
    );
    assert_eq!(
        query.params,
        vec![ParamValue::text("Admission Type"), ParamValue::text("Inpatient")]
    );
}
