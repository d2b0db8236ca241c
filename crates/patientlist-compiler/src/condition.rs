//! Condition lowering
//!
//! Each condition becomes one [`Predicate`] according to the category of its field. The
//! predicate owns every value it binds, so the placeholder order is fixed by the tree shape.

use crate::error::{CompileError, CompileResult};
use crate::options::CompilerOptions;
use chrono::{Months, NaiveDate};
use patientlist_ast::{
    Comparator, Condition, Operator, ParamValue, Predicate, RelativeDate, Translation,
    split_range,
};
use patientlist_diagnostics::{Diagnostic, PL0005, PL0006, Subject};
use patientlist_model::{AliasKind, DataType, FieldCategory, FieldDescriptor, FieldPrefix};

const BIRTHDATE: &str = "p.birthdate";

/// Lowers the conditions of one list, collecting warnings along the way
pub(crate) struct ConditionLowering<'a> {
    options: &'a CompilerOptions,
    today: NaiveDate,
    diagnostics: Vec<Diagnostic>,
}

/// The condition being lowered
struct Target<'c> {
    index: usize,
    condition: &'c Condition,
    operator: Operator,
}

impl Target<'_> {
    /// The value as written; parsers trim it themselves
    fn value(&self) -> &str {
        &self.condition.value
    }

    fn subject(&self) -> Subject {
        Subject::Condition {
            index: self.index,
            field: self.condition.field.clone(),
        }
    }

    fn unsupported(&self) -> CompileError {
        CompileError::UnsupportedOperator {
            index: self.index,
            field: self.condition.field.clone(),
            operator: self.operator,
        }
    }
}

impl<'a> ConditionLowering<'a> {
    pub(crate) fn new(options: &'a CompilerOptions) -> Self {
        Self {
            options,
            today: options.today(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Lower one resolved condition. `Ok(None)` means the condition was dropped.
    pub(crate) fn lower(
        &mut self,
        index: usize,
        condition: &Condition,
        descriptor: &FieldDescriptor,
    ) -> CompileResult<Option<Predicate>> {
        let operator =
            Operator::parse(&condition.operator).ok_or_else(|| CompileError::UnknownOperator {
                index,
                field: condition.field.clone(),
                token: condition.operator.clone(),
            })?;
        let target = Target {
            index,
            condition,
            operator,
        };

        let predicate = match descriptor.category {
            FieldCategory::Attribute => self.attribute(&target, descriptor)?,
            FieldCategory::Alias(kind) => self.alias(&target, descriptor, kind)?,
            FieldCategory::ActiveVisitFlag => active_visit(),
            FieldCategory::DiagnosisFlag => self.diagnosis_flag(),
            FieldCategory::Diagnosis => self.diagnosis(&target)?,
            FieldCategory::Age => self.age(&target)?,
            FieldCategory::Generic => match descriptor.mapping.as_property() {
                Some(path) => self.column(&target, path, descriptor.data_type)?,
                None => {
                    log::warn!(
                        "Dropping condition #{index}: field {} has no query mapping",
                        condition.field
                    );
                    self.diagnostics.push(
                        Diagnostic::warning(
                            PL0005,
                            format!("Field {} has no query mapping", condition.field),
                        )
                        .with_subject(target.subject()),
                    );
                    return Ok(None);
                }
            },
        };

        Ok(Some(predicate))
    }

    /// `(attrType.name = ? AND attr.voided != true AND <test>)`
    fn attribute(
        &mut self,
        target: &Target<'_>,
        descriptor: &FieldDescriptor,
    ) -> CompileResult<Predicate> {
        let (row, type_path, default_value_path) = match descriptor.prefix {
            FieldPrefix::Patient => ("attr", "attrType.name", "attr.value"),
            FieldPrefix::Visit => ("vattr", "vattrType.name", "vattr.valueReference"),
        };
        let value_path = descriptor
            .mapping
            .as_property()
            .unwrap_or(default_value_path);
        let type_name = descriptor
            .attribute_type_name()
            .unwrap_or_else(|| descriptor.name.replace('_', " "));

        let test = match target.operator.translate() {
            Translation::Exists { negated } => Predicate::null_check(row, !negated),
            _ => self.column(target, value_path, DataType::String)?,
        };

        Ok(Predicate::And(vec![
            Predicate::compare(type_path, Comparator::Equal, ParamValue::Text(type_name)),
            Predicate::compare_literal(format!("{row}.voided"), Comparator::NotEqual, "true"),
            test,
        ]))
    }

    fn alias(
        &mut self,
        target: &Target<'_>,
        descriptor: &FieldDescriptor,
        kind: AliasKind,
    ) -> CompileResult<Predicate> {
        if kind == AliasKind::FullName {
            // Each side binds its own copy of the value
            return Ok(Predicate::Or(vec![
                self.column(target, "pnames.givenName", DataType::String)?,
                self.column(target, "pnames.familyName", DataType::String)?,
            ]));
        }

        let leaf = descriptor.mapping.leaf().unwrap_or(&descriptor.name);
        let path = format!("{}.{leaf}", kind.alias());
        self.column(target, &path, descriptor.data_type)
    }

    /// `(ob.voided != true AND (ob.valueCoded.conceptClass.uuid = ? OR ob.valueText != ''))`
    fn diagnosis_flag(&self) -> Predicate {
        Predicate::And(vec![
            observation_not_voided(),
            Predicate::Or(vec![
                Predicate::compare(
                    "ob.valueCoded.conceptClass.uuid",
                    Comparator::Equal,
                    ParamValue::text(self.options.diagnosis_class()),
                ),
                Predicate::compare_literal("ob.valueText", Comparator::NotEqual, "''"),
            ]),
        ])
    }

    /// Digits compare against the coded concept id, anything else against the free text
    fn diagnosis(&mut self, target: &Target<'_>) -> CompileResult<Predicate> {
        let value = target.value();
        let test = match target.operator.translate() {
            Translation::Compare(comparator) if comparator != Comparator::Like => {
                match concept_id(value) {
                    Some(id) => Predicate::compare(
                        "ob.valueCoded.conceptId",
                        comparator,
                        ParamValue::Integer(id),
                    ),
                    None => Predicate::compare("ob.valueText", comparator, ParamValue::text(value)),
                }
            }
            Translation::Between => {
                let (low, high) = split_range(value).unwrap_or((value, value));
                match (concept_id(low), concept_id(high)) {
                    (Some(low), Some(high)) => Predicate::between(
                        "ob.valueCoded.conceptId",
                        ParamValue::Integer(low),
                        ParamValue::Integer(high),
                    ),
                    _ => Predicate::between(
                        "ob.valueText",
                        ParamValue::text(low),
                        ParamValue::text(high),
                    ),
                }
            }
            Translation::Exists { negated } => Predicate::null_check("ob", !negated),
            Translation::Relative => return Err(target.unsupported()),
            _ => self.column(target, "ob.valueText", DataType::String)?,
        };

        Ok(Predicate::And(vec![observation_not_voided(), test]))
    }

    /// Ages become birthdate comparisons with the relational direction mirrored
    fn age(&mut self, target: &Target<'_>) -> CompileResult<Predicate> {
        let value = target.value();
        match target.operator.translate() {
            Translation::Compare(Comparator::Like) | Translation::Relative => {
                Err(target.unsupported())
            }
            Translation::Compare(comparator) => {
                let Some(age) = parse_age(value) else {
                    self.invalid_value(target, value);
                    return Ok(Predicate::compare(
                        BIRTHDATE,
                        comparator.flipped(),
                        ParamValue::text(value),
                    ));
                };

                if comparator == Comparator::Equal {
                    // Born within the year that ends `age` years ago
                    return Ok(Predicate::between(
                        BIRTHDATE,
                        ParamValue::Date(self.years_ago(age.saturating_add(1))),
                        ParamValue::Date(self.years_ago(age)),
                    ));
                }

                let flipped = comparator.flipped();
                let years = match flipped {
                    Comparator::GreaterOrEqual | Comparator::Less => age.saturating_add(1),
                    _ => age,
                };
                Ok(Predicate::compare(
                    BIRTHDATE,
                    flipped,
                    ParamValue::Date(self.years_ago(years)),
                ))
            }
            Translation::Between => {
                let (low, high) = split_range(value).unwrap_or((value, value));
                match (parse_age(low), parse_age(high)) {
                    (Some(low), Some(high)) => Ok(Predicate::between(
                        BIRTHDATE,
                        ParamValue::Date(self.years_ago(high.saturating_add(1))),
                        ParamValue::Date(self.years_ago(low)),
                    )),
                    _ => {
                        self.invalid_value(target, value);
                        Ok(Predicate::between(
                            BIRTHDATE,
                            ParamValue::text(low),
                            ParamValue::text(high),
                        ))
                    }
                }
            }
            Translation::Exists { negated } => Ok(Predicate::null_check(BIRTHDATE, !negated)),
            Translation::Null { negated } => Ok(Predicate::null_check(BIRTHDATE, negated)),
        }
    }

    /// Plain column predicate shared by aliases, attributes and generic fields
    fn column(
        &mut self,
        target: &Target<'_>,
        path: &str,
        data_type: DataType,
    ) -> CompileResult<Predicate> {
        let value = target.value();
        let predicate = match target.operator.translate() {
            Translation::Compare(Comparator::Like) => {
                Predicate::compare(path, Comparator::Like, ParamValue::like_pattern(value))
            }
            Translation::Compare(comparator) => {
                let bound = self.bind(target, value, data_type);
                Predicate::compare(path, comparator, bound)
            }
            Translation::Between => {
                let (low, high) = split_range(value).unwrap_or((value, value));
                let low = self.bind(target, low, data_type);
                let high = self.bind(target, high, data_type);
                Predicate::between(path, low, high)
            }
            Translation::Relative => {
                let range =
                    RelativeDate::parse(value).ok_or_else(|| CompileError::UnknownRelativeRange {
                        index: target.index,
                        field: target.condition.field.clone(),
                        name: value.trim().to_string(),
                    })?;
                let (first, last) = range.bounds(self.today);
                Predicate::between(path, ParamValue::Date(first), ParamValue::Date(last))
            }
            Translation::Exists { negated } => Predicate::null_check(path, !negated),
            Translation::Null { negated } => Predicate::null_check(path, negated),
        };
        Ok(predicate)
    }

    /// Typed parameter for `value`; unparseable dates and integers bind the raw text
    fn bind(&mut self, target: &Target<'_>, value: &str, data_type: DataType) -> ParamValue {
        match data_type {
            DataType::Date => match self.options.parse_date(value) {
                Some(date) => ParamValue::Date(date),
                None => {
                    self.invalid_value(target, value);
                    ParamValue::text(value)
                }
            },
            DataType::Integer => value
                .trim()
                .parse::<i64>()
                .map(ParamValue::Integer)
                .unwrap_or_else(|_| ParamValue::text(value)),
            DataType::String | DataType::Coded | DataType::Boolean => ParamValue::text(value),
        }
    }

    fn invalid_value(&mut self, target: &Target<'_>, value: &str) {
        log::warn!(
            "Condition #{} ({}): cannot read '{}' as a date, binding it as text",
            target.index,
            target.condition.field,
            value
        );
        self.diagnostics.push(
            Diagnostic::warning(PL0006, format!("'{value}' is not a valid date value"))
                .with_subject(target.subject()),
        );
    }

    fn years_ago(&self, years: u32) -> NaiveDate {
        years
            .checked_mul(12)
            .and_then(|months| self.today.checked_sub_months(Months::new(months)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// `(v.startDatetime is not null AND v.stopDatetime is null)`
fn active_visit() -> Predicate {
    Predicate::And(vec![
        Predicate::is_not_null("v.startDatetime"),
        Predicate::is_null("v.stopDatetime"),
    ])
}

fn observation_not_voided() -> Predicate {
    Predicate::compare_literal("ob.voided", Comparator::NotEqual, "true")
}

fn concept_id(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn parse_age(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}
