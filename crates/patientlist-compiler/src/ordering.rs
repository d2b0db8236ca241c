//! Ordering compilation

use patientlist_ast::SortDirection;
use patientlist_model::{AliasKind, FieldCategory, FieldDescriptor, FieldPrefix};
use serde::Serialize;
use std::fmt;

const BIRTHDATE_PATH: &str = "p.birthdate";

/// One `path direction` item of an `order by` clause
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SortKey {
    pub path: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }

    /// Same path, opposite direction
    pub fn inverted(&self) -> Self {
        Self {
            path: self.path.clone(),
            direction: self.direction.inverted(),
        }
    }

    /// Sort keys for an order entry on `descriptor`, or `None` when the field has no
    /// stored column to sort on
    ///
    /// Ages and birthdates sort on the birthdate with the direction inverted, so "age
    /// ascending" lists the youngest first. Full names expand to given then family name and
    /// keep the requested direction.
    pub fn for_field(descriptor: &FieldDescriptor, direction: SortDirection) -> Option<Vec<Self>> {
        let keys = match descriptor.category {
            FieldCategory::Attribute => {
                let path = match descriptor.prefix {
                    FieldPrefix::Patient => "attrType.name",
                    FieldPrefix::Visit => "vattrType.name",
                };
                vec![Self::new(path, direction)]
            }
            FieldCategory::Age => vec![Self::new(BIRTHDATE_PATH, direction).inverted()],
            FieldCategory::Alias(AliasKind::FullName) => vec![
                Self::new("pnames.givenName", direction),
                Self::new("pnames.familyName", direction),
            ],
            FieldCategory::Alias(kind) => {
                let leaf = descriptor.mapping.leaf()?;
                vec![Self::new(format!("{}.{leaf}", kind.alias()), direction)]
            }
            _ => {
                let path = descriptor.mapping.as_property()?;
                let key = Self::new(path, direction);
                if path == BIRTHDATE_PATH {
                    vec![key.inverted()]
                } else {
                    vec![key]
                }
            }
        };
        Some(keys)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.direction)
    }
}

/// `order by a asc, b desc`, or `None` for no keys
pub fn order_clause(keys: &[SortKey]) -> Option<String> {
    if keys.is_empty() {
        return None;
    }
    let items: Vec<String> = keys.iter().map(SortKey::to_string).collect();
    Some(format!("order by {}", items.join(", ")))
}
