//! List evaluation
//!
//! Evaluation compiles the list, optionally runs the count query, then runs the data query
//! for the requested page and turns each row into a [`ListRecord`].

use crate::error::RunnerResult;
use crate::record::{ListPage, ListRecord, record_uuid};
use crate::runner::{PageRequest, QueryRunner, ResultRow};
use crate::template::{FieldTemplateRenderer, TemplateRenderer};
use patientlist_ast::ListDefinition;
use patientlist_compiler::{CompiledQuery, Compiler, CompilerOptions};
use patientlist_diagnostics::PatientListError;
use patientlist_model::FieldRegistry;

/// Evaluates list definitions through a [`QueryRunner`]
pub struct ListExecutor<'r, R> {
    registry: &'r FieldRegistry,
    runner: R,
    options: CompilerOptions,
}

impl<'r, R: QueryRunner> ListExecutor<'r, R> {
    pub fn new(registry: &'r FieldRegistry, runner: R) -> Self {
        Self {
            registry,
            runner,
            options: CompilerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn compile(&self, list: &ListDefinition) -> RunnerResult<CompiledQuery> {
        let compiler = Compiler::new(self.registry).with_options(self.options.clone());
        Ok(compiler.compile(list)?)
    }

    /// Evaluate one page of `list`
    ///
    /// Never fails: any error is logged and reported in [`ListPage::diagnostics`], and the
    /// records assembled before it are returned.
    pub fn evaluate(&self, list: &ListDefinition, page: PageRequest) -> ListPage {
        let mut out = ListPage::default();
        if let Err(err) = self.evaluate_into(list, page, &mut out) {
            log::error!("Evaluating list {} failed: {err}", list.uuid);
            out.diagnostics
                .push(PatientListError::from(err).to_diagnostic());
        }
        out
    }

    /// Evaluate one page of `list`, failing on the first error
    pub fn try_evaluate(&self, list: &ListDefinition, page: PageRequest) -> RunnerResult<ListPage> {
        let mut out = ListPage::default();
        self.evaluate_into(list, page, &mut out)?;
        Ok(out)
    }

    fn evaluate_into(
        &self,
        list: &ListDefinition,
        page: PageRequest,
        out: &mut ListPage,
    ) -> RunnerResult<()> {
        let query = self.compile(list)?;
        out.diagnostics.extend(query.diagnostics.iter().cloned());

        if page.load_record_count {
            out.total_count = Some(self.runner.count(&query)?);
        }

        let renderer = FieldTemplateRenderer::new(self.registry);
        for row in self.runner.fetch(&query, page)? {
            let record = self.assemble(list, row?, &renderer);
            out.records.push(record);
        }

        log::debug!(
            "List {} page {}: {} record(s)",
            list.uuid,
            page.page,
            out.records.len()
        );
        Ok(())
    }

    fn assemble(
        &self,
        list: &ListDefinition,
        row: ResultRow,
        renderer: &impl TemplateRenderer,
    ) -> ListRecord {
        let (patient, visit) = match row {
            ResultRow::Patient(patient) => (patient, None),
            ResultRow::Visit(visit) => (visit.patient.clone(), Some(visit)),
        };
        let mut record = ListRecord {
            uuid: record_uuid(&list.uuid, &patient.uuid),
            patient,
            visit,
            header: None,
            body: None,
        };

        let view = record.view();
        let header = list
            .header_template
            .as_deref()
            .map(|template| renderer.render(template, &view));
        let body = list
            .body_template
            .as_deref()
            .map(|template| renderer.render(template, &view));
        record.header = header;
        record.body = body;
        record
    }
}
