//! Join planning
//!
//! The base entity and the set of joins are derived from the categories of the fields that the
//! compiled conditions and sort keys actually use. Nothing is joined speculatively.

use patientlist_model::{AliasKind, EntityType, FieldCategory, FieldDescriptor, FieldPrefix};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Root entity of the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BaseEntity {
    Patient,
    Visit,
}

impl BaseEntity {
    /// Alias of the selected entity
    pub const fn alias(&self) -> &'static str {
        match self {
            Self::Patient => "p",
            Self::Visit => "v",
        }
    }

    /// `from` clause; the visit base always brings its patient along as `p`
    pub const fn from_clause(&self) -> &'static str {
        match self {
            Self::Patient => "from Patient p",
            Self::Visit => "from Visit v inner join v.patient as p",
        }
    }
}

impl fmt::Display for BaseEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patient => f.write_str("Patient"),
            Self::Visit => f.write_str("Visit"),
        }
    }
}

/// Optional join, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Join {
    PatientAttributes,
    VisitAttributes,
    Diagnoses,
    Names,
    Addresses,
    Identifiers,
}

impl Join {
    pub const fn clause(&self) -> &'static str {
        match self {
            Self::PatientAttributes => {
                "inner join p.attributes as attr inner join attr.attributeType as attrType"
            }
            Self::VisitAttributes => {
                "inner join v.attributes as vattr inner join vattr.attributeType as vattrType"
            }
            Self::Diagnoses => "inner join v.encounters as encounter inner join encounter.obs as ob",
            Self::Names => "inner join p.names as pnames",
            Self::Addresses => "inner join p.addresses as paddresses",
            Self::Identifiers => "inner join p.identifiers as pidentifiers",
        }
    }

    /// Join needed to reach the given field, if any
    pub fn for_field(descriptor: &FieldDescriptor) -> Option<Self> {
        match descriptor.category {
            FieldCategory::Attribute => Some(match descriptor.prefix {
                FieldPrefix::Patient => Self::PatientAttributes,
                FieldPrefix::Visit => Self::VisitAttributes,
            }),
            FieldCategory::Alias(AliasKind::Name | AliasKind::FullName) => Some(Self::Names),
            FieldCategory::Alias(AliasKind::Address) => Some(Self::Addresses),
            FieldCategory::Alias(AliasKind::Identifier) => Some(Self::Identifiers),
            FieldCategory::Diagnosis | FieldCategory::DiagnosisFlag => Some(Self::Diagnoses),
            FieldCategory::Age | FieldCategory::ActiveVisitFlag | FieldCategory::Generic => None,
        }
    }
}

/// Base entity plus the joins the query needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinPlan {
    pub base: BaseEntity,
    pub joins: BTreeSet<Join>,
}

impl JoinPlan {
    /// Plan over every field used by a kept condition or sort key
    pub fn for_fields<'a>(fields: impl IntoIterator<Item = &'a FieldDescriptor>) -> Self {
        let mut base = BaseEntity::Patient;
        let mut joins = BTreeSet::new();

        for descriptor in fields {
            if descriptor.entity == EntityType::Visit || descriptor.category.requires_visit() {
                base = BaseEntity::Visit;
            }
            if let Some(join) = Join::for_field(descriptor) {
                joins.insert(join);
            }
        }

        Self { base, joins }
    }

    /// `from` clause followed by the joins
    pub fn from_clause(&self) -> String {
        let mut out = String::from(self.base.from_clause());
        for join in &self.joins {
            out.push(' ');
            out.push_str(join.clause());
        }
        out
    }
}
