//! List definition compiler

use crate::condition::ConditionLowering;
use crate::emit::Emitter;
use crate::error::CompileResult;
use crate::join::JoinPlan;
use crate::options::CompilerOptions;
use crate::ordering::SortKey;
use crate::query::CompiledQuery;
use patientlist_ast::{Connective, Filter, ListDefinition};
use patientlist_diagnostics::{Diagnostic, PL0001, PL0005, Subject};
use patientlist_model::{FieldCategory, FieldDescriptor, FieldRegistry};

/// Compiles list definitions against a field registry
#[derive(Debug, Clone)]
pub struct Compiler<'r> {
    registry: &'r FieldRegistry,
    options: CompilerOptions,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self {
            registry,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile `list` into a count/data query pair
    ///
    /// Conditions and order entries whose field does not resolve are dropped and reported in
    /// [`CompiledQuery::diagnostics`]. An unknown operator or relative range fails the
    /// whole compile.
    pub fn compile(&self, list: &ListDefinition) -> CompileResult<CompiledQuery> {
        let mut diagnostics = Vec::new();
        let mut used: Vec<&FieldDescriptor> = Vec::new();

        let resolved: Vec<_> = list
            .conditions
            .iter()
            .enumerate()
            .filter_map(|(index, condition)| {
                match self.resolve(&condition.field, || Subject::Condition {
                    index,
                    field: condition.field.clone(),
                }) {
                    Ok(descriptor) => Some((index, condition, descriptor)),
                    Err(diagnostic) => {
                        diagnostics.push(diagnostic);
                        None
                    }
                }
            })
            .collect();

        let has_active_visit = resolved
            .iter()
            .any(|(_, _, descriptor)| descriptor.category == FieldCategory::ActiveVisitFlag);

        let mut lowering = ConditionLowering::new(&self.options);
        let mut filter = Filter::new();
        let mut previous_is_attribute = false;
        for (index, condition, descriptor) in resolved {
            let Some(predicate) = lowering.lower(index, condition, descriptor)? else {
                continue;
            };
            let is_attribute = descriptor.category == FieldCategory::Attribute;
            let connective = if previous_is_attribute && is_attribute && !has_active_visit {
                Connective::Or
            } else {
                Connective::And
            };
            filter.push(connective, predicate);
            previous_is_attribute = is_attribute;
            used.push(descriptor);
        }
        diagnostics.extend(lowering.into_diagnostics());

        let mut order_by = Vec::new();
        for (index, entry) in list.ordering.iter().enumerate() {
            let subject = || Subject::OrderEntry {
                index,
                field: entry.field.clone(),
            };
            let descriptor = match self.resolve(&entry.field, subject) {
                Ok(descriptor) => descriptor,
                Err(diagnostic) => {
                    diagnostics.push(diagnostic);
                    continue;
                }
            };
            match SortKey::for_field(descriptor, entry.direction) {
                Some(keys) => {
                    order_by.extend(keys);
                    used.push(descriptor);
                }
                None => {
                    log::warn!(
                        "Dropping order entry #{index}: field {} has no sortable column",
                        entry.field
                    );
                    diagnostics.push(
                        Diagnostic::warning(
                            PL0005,
                            format!("Field {} has no sortable column", entry.field),
                        )
                        .with_subject(subject()),
                    );
                }
            }
        }

        let plan = JoinPlan::for_fields(used);
        let (predicate, params) = if filter.is_empty() {
            (None, Vec::new())
        } else {
            let mut emitter = Emitter::new();
            emitter.filter(&filter);
            let (text, params) = emitter.finish();
            (Some(text), params)
        };

        let query = CompiledQuery {
            plan,
            predicate,
            order_by,
            params,
            diagnostics,
        };
        log::debug!(
            "Compiled list {}: {} with {} parameter(s)",
            list.uuid,
            query.data_text(),
            query.params.len()
        );
        Ok(query)
    }

    fn resolve(
        &self,
        field: &str,
        subject: impl FnOnce() -> Subject,
    ) -> Result<&'r FieldDescriptor, Diagnostic> {
        self.registry.lookup(field).ok_or_else(|| {
            let subject = subject();
            log::warn!("Dropping {subject}: unknown field");
            Diagnostic::warning(PL0001, format!("Unknown field {field}")).with_subject(subject)
        })
    }
}

/// Compile `list` with default options
pub fn compile(registry: &FieldRegistry, list: &ListDefinition) -> CompileResult<CompiledQuery> {
    Compiler::new(registry).compile(list)
}
