//! Predicate emission
//!
//! Writing a placeholder and pushing its value happen in the same call, so the emitted text
//! and the parameter list cannot drift apart.

use patientlist_ast::{Filter, Operand, ParamValue, Predicate};

#[derive(Debug, Default)]
pub struct Emitter {
    text: String,
    params: Vec<ParamValue>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `(t1 AND t2 OR t3)` for a non-empty filter
    pub fn filter(&mut self, filter: &Filter) {
        self.text.push('(');
        for (i, term) in filter.terms().iter().enumerate() {
            if i > 0 {
                self.text.push(' ');
                self.text.push_str(term.connective.keyword());
                self.text.push(' ');
            }
            self.predicate(&term.predicate);
        }
        self.text.push(')');
    }

    pub fn predicate(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::Comparison {
                path,
                comparator,
                operand,
            } => {
                self.text.push_str(path);
                self.text.push(' ');
                self.text.push_str(comparator.symbol());
                self.text.push(' ');
                match operand {
                    Operand::Param(value) => self.placeholder(value),
                    Operand::Literal(literal) => self.text.push_str(literal),
                }
            }
            Predicate::Between { path, low, high } => {
                self.text.push_str(path);
                self.text.push_str(" BETWEEN ");
                self.placeholder(low);
                self.text.push_str(" AND ");
                self.placeholder(high);
            }
            Predicate::Null { path, negated } => {
                self.text.push_str(path);
                self.text
                    .push_str(if *negated { " is not null" } else { " is null" });
            }
            Predicate::And(children) => self.group(children, " AND "),
            Predicate::Or(children) => self.group(children, " OR "),
        }
    }

    fn group(&mut self, children: &[Predicate], separator: &str) {
        self.text.push('(');
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                self.text.push_str(separator);
            }
            self.predicate(child);
        }
        self.text.push(')');
    }

    fn placeholder(&mut self, value: &ParamValue) {
        self.text.push('?');
        self.params.push(value.clone());
    }

    pub fn finish(self) -> (String, Vec<ParamValue>) {
        (self.text, self.params)
    }
}
