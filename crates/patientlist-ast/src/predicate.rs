//! Predicate tree produced by the condition compiler
//!
//! Every bound value lives inside the node that compares against it, so emitting the tree
//! produces placeholders and parameters in the same pass and in the same order.

use crate::{Comparator, ParamValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    /// Bound through a `?` placeholder
    Param(ParamValue),
    /// Fixed query text (`true`, `''`), never bound
    Literal(String),
}

/// A boolean predicate over joined entity paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// `path <op> operand`
    Comparison {
        path: String,
        comparator: Comparator,
        operand: Operand,
    },
    /// `path BETWEEN ? AND ?`
    Between {
        path: String,
        low: ParamValue,
        high: ParamValue,
    },
    /// `path is null` / `path is not null`
    Null { path: String, negated: bool },
    /// Parenthesized conjunction
    And(Vec<Predicate>),
    /// Parenthesized disjunction
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Comparison against a bound value
    pub fn compare(path: impl Into<String>, comparator: Comparator, value: ParamValue) -> Self {
        Self::Comparison {
            path: path.into(),
            comparator,
            operand: Operand::Param(value),
        }
    }

    /// Comparison against fixed query text
    pub fn compare_literal(
        path: impl Into<String>,
        comparator: Comparator,
        literal: impl Into<String>,
    ) -> Self {
        Self::Comparison {
            path: path.into(),
            comparator,
            operand: Operand::Literal(literal.into()),
        }
    }

    pub fn between(path: impl Into<String>, low: ParamValue, high: ParamValue) -> Self {
        Self::Between {
            path: path.into(),
            low,
            high,
        }
    }

    pub fn is_null(path: impl Into<String>) -> Self {
        Self::Null {
            path: path.into(),
            negated: false,
        }
    }

    pub fn is_not_null(path: impl Into<String>) -> Self {
        Self::Null {
            path: path.into(),
            negated: true,
        }
    }

    /// `path is not null` when `negated`, `path is null` otherwise
    pub fn null_check(path: impl Into<String>, negated: bool) -> Self {
        Self::Null {
            path: path.into(),
            negated,
        }
    }

    /// Bound values in placeholder order
    pub fn params(&self) -> Vec<&ParamValue> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params<'a>(&'a self, out: &mut Vec<&'a ParamValue>) {
        match self {
            Self::Comparison {
                operand: Operand::Param(value),
                ..
            } => out.push(value),
            Self::Comparison { .. } | Self::Null { .. } => {}
            Self::Between { low, high, .. } => {
                out.push(low);
                out.push(high);
            }
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_params(out);
                }
            }
        }
    }
}

/// Word joining two top-level predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Flat sequence of predicates joined left to right, as written in the list definition
///
/// The sequence is emitted without extra grouping, so mixed connectives follow the query
/// language's own AND-before-OR precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    terms: Vec<FilterTerm>,
}

/// One predicate of a [`Filter`] and the connective joining it to its predecessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTerm {
    /// Ignored for the first term
    pub connective: Connective,
    pub predicate: Predicate,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate, joined to the previous one by `connective`
    pub fn push(&mut self, connective: Connective, predicate: Predicate) {
        self.terms.push(FilterTerm {
            connective,
            predicate,
        });
    }

    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Bound values of all terms in placeholder order
    pub fn params(&self) -> Vec<&ParamValue> {
        self.terms
            .iter()
            .flat_map(|term| term.predicate.params())
            .collect()
    }
}
