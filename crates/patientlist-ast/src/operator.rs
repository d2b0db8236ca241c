//! Condition operators and their translation to query comparisons

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator vocabulary accepted in list conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equals,
    NotEquals,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    /// Substring match, bound as a `%value%` LIKE pattern
    Contains,
    /// Range match; the value holds `low|high`
    Between,
    Exists,
    NotExists,
    /// Named relative date range, rewritten to BETWEEN
    Relative,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub const ALL: [Operator; 13] = [
        Self::Equals,
        Self::NotEquals,
        Self::Greater,
        Self::Less,
        Self::GreaterOrEqual,
        Self::LessOrEqual,
        Self::Contains,
        Self::Between,
        Self::Exists,
        Self::NotExists,
        Self::Relative,
        Self::IsNull,
        Self::IsNotNull,
    ];

    /// Parse an operator token, case-insensitively. Unknown tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        let op = match normalized.as_str() {
            "EQUALS" | "EQUAL" | "EQ" => Self::Equals,
            "NOT_EQUALS" | "NOT_EQUAL" | "NE" => Self::NotEquals,
            "GREATER" | "GREATER_THAN" | "GT" => Self::Greater,
            "LESS" | "LESS_THAN" | "LT" => Self::Less,
            "GREATER_OR_EQUAL" | "GREATER_THAN_OR_EQUAL" | "GTE" => Self::GreaterOrEqual,
            "LESS_OR_EQUAL" | "LESS_THAN_OR_EQUAL" | "LTE" => Self::LessOrEqual,
            "CONTAINS" | "LIKE" => Self::Contains,
            "BETWEEN" => Self::Between,
            "EXISTS" => Self::Exists,
            "NOT_EXISTS" => Self::NotExists,
            "RELATIVE" => Self::Relative,
            "IS_NULL" | "NULL" => Self::IsNull,
            "IS_NOT_NULL" | "NOT_NULL" => Self::IsNotNull,
            _ => return None,
        };
        Some(op)
    }

    /// Canonical token
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::Greater => "GREATER",
            Self::Less => "LESS",
            Self::GreaterOrEqual => "GREATER_OR_EQUAL",
            Self::LessOrEqual => "LESS_OR_EQUAL",
            Self::Contains => "CONTAINS",
            Self::Between => "BETWEEN",
            Self::Exists => "EXISTS",
            Self::NotExists => "NOT_EXISTS",
            Self::Relative => "RELATIVE",
            Self::IsNull => "IS_NULL",
            Self::IsNotNull => "IS_NOT_NULL",
        }
    }

    /// Translate to the query-side form of the operator
    pub const fn translate(&self) -> Translation {
        match self {
            Self::Equals => Translation::Compare(Comparator::Equal),
            Self::NotEquals => Translation::Compare(Comparator::NotEqual),
            Self::Greater => Translation::Compare(Comparator::Greater),
            Self::Less => Translation::Compare(Comparator::Less),
            Self::GreaterOrEqual => Translation::Compare(Comparator::GreaterOrEqual),
            Self::LessOrEqual => Translation::Compare(Comparator::LessOrEqual),
            Self::Contains => Translation::Compare(Comparator::Like),
            Self::Between => Translation::Between,
            Self::Exists => Translation::Exists { negated: false },
            Self::NotExists => Translation::Exists { negated: true },
            Self::Relative => Translation::Relative,
            Self::IsNull => Translation::Null { negated: false },
            Self::IsNotNull => Translation::Null { negated: true },
        }
    }

    /// Whether the operator compares against a bound value
    pub const fn binds_value(&self) -> bool {
        !matches!(
            self,
            Self::Exists | Self::NotExists | Self::IsNull | Self::IsNotNull
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Result of translating an [`Operator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Translation {
    /// Binary comparison against one bound value
    Compare(Comparator),
    /// `BETWEEN ? AND ?`
    Between,
    /// Presence of the joined row
    Exists { negated: bool },
    /// `IS NULL` / `IS NOT NULL` on the column
    Null { negated: bool },
    /// Needs rewriting to [`Translation::Between`] with computed date bounds
    Relative,
}

/// Comparison tokens of the emitted query language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Like,
}

impl Comparator {
    /// Get the comparison symbol
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Like => "LIKE",
        }
    }

    /// Mirror the relational direction (`<` becomes `>` and vice versa)
    pub const fn flipped(&self) -> Self {
        match self {
            Self::Greater => Self::Less,
            Self::Less => Self::Greater,
            Self::GreaterOrEqual => Self::LessOrEqual,
            Self::LessOrEqual => Self::GreaterOrEqual,
            other => *other,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
