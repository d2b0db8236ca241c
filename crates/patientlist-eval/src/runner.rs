//! Query runner abstraction
//!
//! The core never talks to a store directly. A [`QueryRunner`] receives the compiled query
//! text with its positional parameters and hands back typed rows.

use crate::error::{RunnerError, RunnerResult};
use patientlist_ast::ParamValue;
use patientlist_compiler::{BaseEntity, CompiledQuery};
use parking_lot::Mutex;
use patientlist_model::{Patient, Visit};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One row of a data query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResultRow {
    Patient(Patient),
    Visit(Visit),
}

impl ResultRow {
    pub fn patient(&self) -> &Patient {
        match self {
            Self::Patient(patient) => patient,
            Self::Visit(visit) => &visit.patient,
        }
    }

    pub fn visit(&self) -> Option<&Visit> {
        match self {
            Self::Patient(_) => None,
            Self::Visit(visit) => Some(visit),
        }
    }
}

/// Which page of the list to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
    /// Run the count query as well
    pub load_record_count: bool,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
            load_record_count: false,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            load_record_count: false,
        }
    }

    pub fn with_count(mut self) -> Self {
        self.load_record_count = true;
        self
    }

    /// Rows to skip before the page starts
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Rows streamed back from a data query
pub type RowIter<'a> = Box<dyn Iterator<Item = RunnerResult<ResultRow>> + 'a>;

/// Executes compiled queries against a store
pub trait QueryRunner {
    /// Run the count form of `query`
    fn count(&self, query: &CompiledQuery) -> RunnerResult<u64>;

    /// Run the data form of `query`, limited to `page`
    fn fetch<'a>(&'a self, query: &CompiledQuery, page: PageRequest) -> RunnerResult<RowIter<'a>>;
}

impl<R: QueryRunner + ?Sized> QueryRunner for &R {
    fn count(&self, query: &CompiledQuery) -> RunnerResult<u64> {
        (**self).count(query)
    }

    fn fetch<'a>(&'a self, query: &CompiledQuery, page: PageRequest) -> RunnerResult<RowIter<'a>> {
        (**self).fetch(query, page)
    }
}

/// Whether a recorded query was the count or the data form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Count,
    Data,
}

/// A query as received by [`InMemoryRunner`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedQuery {
    pub kind: QueryKind,
    pub text: String,
    pub params: Vec<ParamValue>,
    pub page: Option<PageRequest>,
}

/// Runner over a fixed set of rows
///
/// Query text is not interpreted. A visit-based query sees the visit rows. A patient-based
/// query sees the patient rows plus the distinct patients of the visit rows. Every query is
/// recorded and can be inspected with [`InMemoryRunner::queries`].
#[derive(Debug, Default)]
pub struct InMemoryRunner {
    rows: Vec<ResultRow>,
    fail_at: Option<usize>,
    fail_count: bool,
    queries: Mutex<Vec<RecordedQuery>>,
}

impl InMemoryRunner {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Make the row at `index` (within the page) fail to load
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Make every count query fail
    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    /// Queries received so far, oldest first
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().clone()
    }

    fn record(&self, query: RecordedQuery) {
        self.queries.lock().push(query);
    }

    fn matching(&self, base: BaseEntity) -> Vec<ResultRow> {
        match base {
            BaseEntity::Visit => self
                .rows
                .iter()
                .filter(|row| matches!(row, ResultRow::Visit(_)))
                .cloned()
                .collect(),
            BaseEntity::Patient => {
                let mut seen = HashSet::new();
                self.rows
                    .iter()
                    .filter(|row| seen.insert(row.patient().uuid.clone()))
                    .map(|row| ResultRow::Patient(row.patient().clone()))
                    .collect()
            }
        }
    }
}

impl QueryRunner for InMemoryRunner {
    fn count(&self, query: &CompiledQuery) -> RunnerResult<u64> {
        self.record(RecordedQuery {
            kind: QueryKind::Count,
            text: query.count_text(),
            params: query.params.clone(),
            page: None,
        });
        if self.fail_count {
            return Err(RunnerError::count("count query rejected"));
        }
        Ok(self.matching(query.base()).len() as u64)
    }

    fn fetch<'a>(&'a self, query: &CompiledQuery, page: PageRequest) -> RunnerResult<RowIter<'a>> {
        self.record(RecordedQuery {
            kind: QueryKind::Data,
            text: query.data_text(),
            params: query.params.clone(),
            page: Some(page),
        });

        let fail_at = self.fail_at;
        let rows = self
            .matching(query.base())
            .into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .enumerate()
            .map(move |(index, row)| match fail_at {
                Some(at) if at == index => Err(RunnerError::row(index, "row could not be loaded")),
                _ => Ok(row),
            });
        Ok(Box::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patientlist_ast::ListDefinition;
    use patientlist_model::FieldRegistry;
    use pretty_assertions::assert_eq;

    fn rows() -> Vec<ResultRow> {
        let alice = Patient::new(1, "p-1");
        let bob = Patient::new(2, "p-2");
        vec![
            ResultRow::Visit(Visit::new(10, "v-10", alice.clone())),
            ResultRow::Visit(Visit::new(11, "v-11", alice)),
            ResultRow::Patient(bob),
        ]
    }

    fn patient_query() -> CompiledQuery {
        let registry = FieldRegistry::standard();
        patientlist_compiler::compile(&registry, &ListDefinition::new("l", "All")).unwrap()
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
        assert_eq!(PageRequest::new(0, 20).offset(), 0);
    }

    #[test]
    fn test_patient_base_dedupes_patients() {
        let runner = InMemoryRunner::new(rows());
        let query = patient_query();

        assert_eq!(runner.count(&query).unwrap(), 2);
        let fetched: Vec<_> = runner
            .fetch(&query, PageRequest::default())
            .unwrap()
            .collect::<RunnerResult<_>>()
            .unwrap();
        assert_eq!(
            fetched
                .iter()
                .map(|row| row.patient().uuid.as_str())
                .collect::<Vec<_>>(),
            vec!["p-1", "p-2"]
        );
    }

    #[test]
    fn test_records_queries() {
        let runner = InMemoryRunner::new(rows());
        let query = patient_query();
        runner.count(&query).unwrap();
        let _ = runner.fetch(&query, PageRequest::new(2, 1)).unwrap();

        let recorded = runner.queries();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].kind, QueryKind::Count);
        assert_eq!(recorded[0].text, "select count(p) from Patient p");
        assert_eq!(recorded[1].page, Some(PageRequest::new(2, 1)));
    }

    #[test]
    fn test_records_queries_from_several_threads() {
        let runner = InMemoryRunner::new(rows());
        let query = patient_query();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| runner.count(&query).unwrap());
            }
        });

        let recorded = runner.queries();
        assert_eq!(recorded.len(), 4);
        assert!(recorded.iter().all(|q| q.kind == QueryKind::Count));
    }

    #[test]
    fn test_row_deserialization() {
        let json = r#"[
            {"type": "patient", "id": 1, "uuid": "p-1"},
            {"type": "visit", "id": 5, "uuid": "v-5", "patient": {"id": 1, "uuid": "p-1"}}
        ]"#;
        let rows: Vec<ResultRow> = serde_json::from_str(json).unwrap();
        assert!(rows[0].visit().is_none());
        assert_eq!(rows[1].visit().map(|v| v.id), Some(5));
        assert_eq!(rows[1].patient().uuid, "p-1");
    }
}
