//! List definitions as supplied by the metadata service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the two halves of a range value (`"18|65"`, `"2024-01-01|2024-02-01"`)
pub const RANGE_SEPARATOR: char = '|';

/// A reusable patient list: filter conditions, sort rules and display templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDefinition {
    /// Stable identifier of the list
    pub uuid: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Filter conditions, in evaluation order
    #[serde(default, alias = "patientListConditions")]
    pub conditions: Vec<Condition>,
    /// Sort rules, most significant first
    #[serde(default)]
    pub ordering: Vec<OrderEntry>,
    #[serde(default)]
    pub header_template: Option<String>,
    #[serde(default)]
    pub body_template: Option<String>,
}

impl ListDefinition {
    /// Create an empty list definition
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            description: None,
            conditions: Vec::new(),
            ordering: Vec::new(),
            header_template: None,
            body_template: None,
        }
    }

    /// Add a condition
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an order entry
    pub fn with_order(mut self, order: OrderEntry) -> Self {
        self.ordering.push(order);
        self
    }

    /// Set the header template
    pub fn with_header_template(mut self, template: impl Into<String>) -> Self {
        self.header_template = Some(template.into());
        self
    }

    /// Set the body template
    pub fn with_body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = Some(template.into());
        self
    }
}

/// One filter rule of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Field identifier, resolved through the field registry
    pub field: String,
    /// Operator token (`EQUALS`, `BETWEEN`, `RELATIVE`, ...)
    pub operator: String,
    /// Raw value; ranges are encoded as `low|high`
    #[serde(default)]
    pub value: String,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Split a `low|high` value into its two halves
    pub fn range(&self) -> Option<(&str, &str)> {
        split_range(&self.value)
    }
}

/// Split a `low|high` value. Empty halves are ignored, so `"|5"` is not a range.
pub fn split_range(value: &str) -> Option<(&str, &str)> {
    let mut parts = value.split(RANGE_SEPARATOR).filter(|part| !part.is_empty());
    let low = parts.next()?;
    let high = parts.next()?;
    Some((low.trim(), high.trim()))
}

/// One sort rule of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    /// Field identifier, resolved through the field registry
    pub field: String,
    #[serde(rename = "sortOrder", default)]
    pub direction: SortDirection,
}

impl OrderEntry {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc", alias = "ASC")]
    Ascending,
    #[serde(rename = "desc", alias = "DESC")]
    Descending,
}

impl SortDirection {
    /// The opposite direction
    pub const fn inverted(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Get the keyword
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
