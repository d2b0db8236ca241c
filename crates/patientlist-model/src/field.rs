//! Field descriptors
//!
//! A descriptor tells the compiler how a field identifier such as `patient.attr.Bed_Number`
//! maps onto the relational schema, and tells the template renderer how to read its value from
//! a result row.

use crate::entity::RecordView;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Namespace of a field identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPrefix {
    Patient,
    Visit,
}

impl FieldPrefix {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Visit => "visit",
        }
    }
}

impl fmt::Display for FieldPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Date,
    Coded,
    Boolean,
}

impl DataType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Date => "date",
            Self::Coded => "coded",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relational entity that owns the field's data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Patient,
    Visit,
}

/// Collection reached through an alias join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AliasKind {
    /// A single name part
    Name,
    /// Given and family name together
    FullName,
    Address,
    Identifier,
}

impl AliasKind {
    /// Query alias of the joined collection
    pub const fn alias(&self) -> &'static str {
        match self {
            Self::Name | Self::FullName => "pnames",
            Self::Address => "paddresses",
            Self::Identifier => "pidentifiers",
        }
    }
}

/// Classification that drives condition compilation and join planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "alias", rename_all = "camelCase")]
pub enum FieldCategory {
    Attribute,
    Alias(AliasKind),
    Diagnosis,
    DiagnosisFlag,
    Age,
    ActiveVisitFlag,
    Generic,
}

impl FieldCategory {
    /// Whether a condition on this category needs the visit as the query base
    pub const fn requires_visit(&self) -> bool {
        matches!(
            self,
            Self::Diagnosis | Self::DiagnosisFlag | Self::ActiveVisitFlag
        )
    }
}

/// Where a field lives in the relational schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingPath {
    /// Dot path from an entity alias, e.g. `p.names.givenName`
    Property(String),
    /// Computed from other data, not stored
    Derived,
}

impl MappingPath {
    pub fn property(path: impl Into<String>) -> Self {
        Self::Property(path.into())
    }

    pub fn as_property(&self) -> Option<&str> {
        match self {
            Self::Property(path) => Some(path),
            Self::Derived => None,
        }
    }

    /// Last segment of the path
    pub fn leaf(&self) -> Option<&str> {
        self.as_property()
            .map(|path| path.rsplit('.').next().unwrap_or(path))
    }
}

impl fmt::Display for MappingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(path) => f.write_str(path),
            Self::Derived => f.write_str("<derived>"),
        }
    }
}

/// Reads a field's display value from a result row
pub type ValueExtractor = Arc<dyn Fn(&RecordView<'_>) -> Option<String> + Send + Sync>;

/// Marker in attribute field names, e.g. `attr.Bed_Number`
pub const ATTRIBUTE_MARKER: &str = "attr.";

/// Everything the compiler and renderer know about one field
#[derive(Clone)]
pub struct FieldDescriptor {
    pub prefix: FieldPrefix,
    pub name: String,
    pub data_type: DataType,
    pub entity: EntityType,
    pub category: FieldCategory,
    pub mapping: MappingPath,
    pub description: String,
    extractor: Option<ValueExtractor>,
}

impl FieldDescriptor {
    pub fn new(
        prefix: FieldPrefix,
        name: impl Into<String>,
        data_type: DataType,
        category: FieldCategory,
        mapping: MappingPath,
    ) -> Self {
        let entity = match prefix {
            FieldPrefix::Patient => EntityType::Patient,
            FieldPrefix::Visit => EntityType::Visit,
        };
        Self {
            prefix,
            name: name.into(),
            data_type,
            entity,
            category,
            mapping,
            description: String::new(),
            extractor: None,
        }
    }

    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entity = entity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_extractor(
        mut self,
        extractor: impl Fn(&RecordView<'_>) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Full identifier, e.g. `patient.fullName`
    pub fn id(&self) -> String {
        format!("{}.{}", self.prefix, self.name)
    }

    /// Attribute type name for attribute fields, with underscores read as spaces
    pub fn attribute_type_name(&self) -> Option<String> {
        if self.category != FieldCategory::Attribute {
            return None;
        }
        self.name
            .strip_prefix(ATTRIBUTE_MARKER)
            .map(|name| name.replace('_', " "))
    }

    /// Display value for template rendering
    pub fn value(&self, view: &RecordView<'_>) -> Option<String> {
        self.extractor.as_ref().and_then(|extract| extract(view))
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id())
            .field("data_type", &self.data_type)
            .field("entity", &self.entity)
            .field("category", &self.category)
            .field("mapping", &self.mapping)
            .finish_non_exhaustive()
    }
}

/// Field identifier with its description, as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub field: String,
    pub description: String,
    pub data_type: DataType,
}

impl From<&FieldDescriptor> for FieldSummary {
    fn from(descriptor: &FieldDescriptor) -> Self {
        Self {
            field: descriptor.id(),
            description: descriptor.description.clone(),
            data_type: descriptor.data_type,
        }
    }
}
