//! Compiled query

use crate::join::{BaseEntity, Join, JoinPlan};
use crate::ordering::{SortKey, order_clause};
use patientlist_ast::ParamValue;
use patientlist_diagnostics::Diagnostic;
use serde::Serialize;

/// A list definition lowered to query text and positional parameters
///
/// The count and data forms share the same joins, predicate and parameters. Only the
/// projection differs, and the data form adds the ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledQuery {
    pub plan: JoinPlan,
    /// Parenthesized predicate, `None` when no condition survived
    pub predicate: Option<String>,
    pub order_by: Vec<SortKey>,
    /// Values for the `?` placeholders of `predicate`, in order
    pub params: Vec<ParamValue>,
    /// Entries dropped or degraded while compiling
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledQuery {
    pub fn base(&self) -> BaseEntity {
        self.plan.base
    }

    pub fn joins(&self) -> impl Iterator<Item = Join> + '_ {
        self.plan.joins.iter().copied()
    }

    /// Everything after the projection: `from`, joins and `where`
    pub fn body(&self) -> String {
        let mut body = self.plan.from_clause();
        if let Some(predicate) = &self.predicate {
            body.push_str(" where ");
            body.push_str(predicate);
        }
        body
    }

    /// `select count(p) from ...`, without ordering
    pub fn count_text(&self) -> String {
        format!("select count({}) {}", self.base().alias(), self.body())
    }

    /// `select p from ... order by ...`
    pub fn data_text(&self) -> String {
        let mut text = format!("select {} {}", self.base().alias(), self.body());
        if let Some(order) = order_clause(&self.order_by) {
            text.push(' ');
            text.push_str(&order);
        }
        text
    }

    /// Number of `?` placeholders in the predicate
    pub fn placeholder_count(&self) -> usize {
        self.predicate
            .as_deref()
            .map_or(0, |predicate| predicate.matches('?').count())
    }
}
