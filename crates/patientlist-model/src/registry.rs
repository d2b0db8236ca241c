//! Field registry
//!
//! The registry is built once at startup from the standard catalog plus the attribute type
//! names known to the deployment. After [`FieldRegistryBuilder::build`] it is read-only, so a
//! single instance can be shared across threads behind an `Arc`.

use crate::catalog::{self, Templates};
use crate::field::{FieldDescriptor, FieldPrefix, FieldSummary};
use indexmap::IndexMap;
use patientlist_diagnostics::{ErrorCode, PL0100, PL0101, PatientListError};

/// Registry construction error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Field '{0}' is registered twice")]
    DuplicateField(String),

    #[error("Invalid {prefix} attribute type name '{name}'")]
    InvalidAttributeName { prefix: FieldPrefix, name: String },
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateField(_) => PL0100,
            Self::InvalidAttributeName { .. } => PL0101,
        }
    }
}

impl From<RegistryError> for PatientListError {
    fn from(err: RegistryError) -> Self {
        PatientListError::model(err.code(), err.to_string())
    }
}

/// Immutable map from field identifier to descriptor, in registration order
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: IndexMap<String, FieldDescriptor>,
}

impl FieldRegistry {
    pub fn builder() -> FieldRegistryBuilder {
        FieldRegistryBuilder::default()
    }

    /// Registry holding only the standard catalog
    pub fn standard() -> Self {
        let fields = catalog::standard_fields()
            .into_iter()
            .map(|descriptor| (descriptor.id(), descriptor))
            .collect();
        Self { fields }
    }

    pub fn lookup(&self, field_id: &str) -> Option<&FieldDescriptor> {
        self.fields.get(field_id)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.fields.contains_key(field_id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// `{field, description}` entries in registration order
    pub fn catalog(&self) -> Vec<FieldSummary> {
        self.fields.values().map(FieldSummary::from).collect()
    }

    pub fn default_templates(&self) -> Templates {
        catalog::default_templates()
    }

    /// Attribute type names registered under the given prefix
    pub fn attribute_types(&self, prefix: FieldPrefix) -> Vec<String> {
        self.fields
            .values()
            .filter(|descriptor| descriptor.prefix == prefix)
            .filter_map(FieldDescriptor::attribute_type_name)
            .collect()
    }
}

/// Collects descriptors and validates them into a [`FieldRegistry`]
#[derive(Debug, Default)]
pub struct FieldRegistryBuilder {
    standard: bool,
    person_attributes: Vec<String>,
    visit_attributes: Vec<String>,
    extra: Vec<FieldDescriptor>,
}

impl FieldRegistryBuilder {
    /// Include the standard catalog
    pub fn with_standard_fields(mut self) -> Self {
        self.standard = true;
        self
    }

    pub fn person_attribute(mut self, type_name: impl Into<String>) -> Self {
        self.person_attributes.push(type_name.into());
        self
    }

    pub fn person_attributes<I, S>(mut self, type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.person_attributes
            .extend(type_names.into_iter().map(Into::into));
        self
    }

    pub fn visit_attribute(mut self, type_name: impl Into<String>) -> Self {
        self.visit_attributes.push(type_name.into());
        self
    }

    pub fn visit_attributes<I, S>(mut self, type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visit_attributes
            .extend(type_names.into_iter().map(Into::into));
        self
    }

    /// Register a custom descriptor
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.extra.push(descriptor);
        self
    }

    pub fn build(self) -> Result<FieldRegistry, RegistryError> {
        let mut fields = IndexMap::new();

        let standard = if self.standard {
            catalog::standard_fields()
        } else {
            Vec::new()
        };
        let person = attribute_fields(
            FieldPrefix::Patient,
            &self.person_attributes,
            catalog::person_attribute_field,
        )?;
        let visit = attribute_fields(
            FieldPrefix::Visit,
            &self.visit_attributes,
            catalog::visit_attribute_field,
        )?;

        for descriptor in standard.into_iter().chain(person).chain(visit).chain(self.extra) {
            let id = descriptor.id();
            if fields.contains_key(&id) {
                return Err(RegistryError::DuplicateField(id));
            }
            fields.insert(id, descriptor);
        }

        Ok(FieldRegistry { fields })
    }
}

fn attribute_fields(
    prefix: FieldPrefix,
    names: &[String],
    make: fn(&str) -> FieldDescriptor,
) -> Result<Vec<FieldDescriptor>, RegistryError> {
    names
        .iter()
        .map(|name| {
            let trimmed = name.trim();
            // Underscores stand for spaces in field ids, so they cannot appear in the type name
            if trimmed.is_empty() || trimmed.contains('_') || trimmed.contains('.') {
                return Err(RegistryError::InvalidAttributeName {
                    prefix,
                    name: name.clone(),
                });
            }
            Ok(make(trimmed))
        })
        .collect()
}
