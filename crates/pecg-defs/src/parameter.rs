//! Report parameters and parameter mappings
//!
//! Every definition declares the parameters it expects; a [`ParameterMapping`]
//! binds those parameters to values from the enclosing scope when one
//! definition embeds another. Mappings round-trip through the compact text
//! form used by the host platform, e.g. `"onOrAfter=${reportingStartDate}"`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DefinitionError;

/// Type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    /// Calendar date
    Date,
    /// Whole number
    Integer,
    /// Free text
    Text,
}

/// A named, typed parameter declared by a definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, referenced by mappings
    pub name: String,
    /// Human-readable label shown by the host's report-running UI
    pub label: String,
    /// Value type
    pub param_type: ParameterType,
}

impl Parameter {
    /// Create a parameter
    pub fn new(name: impl Into<String>, label: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            param_type,
        }
    }

    /// Create a date parameter
    pub fn date(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ParameterType::Date)
    }

    /// Create an integer parameter
    pub fn integer(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ParameterType::Integer)
    }

    /// Create a text parameter
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, ParameterType::Text)
    }
}

/// Where a mapped parameter takes its value from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingSource {
    /// The enclosing scope's parameter of this name (`${name}` in text form)
    Parameter(String),
    /// A fixed literal value
    Literal(String),
}

/// Ordered bindings from a definition's parameters to the enclosing scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMapping {
    entries: IndexMap<String, MappingSource>,
}

impl ParameterMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `target` to the enclosing scope's parameter `source`
    pub fn map(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.entries
            .insert(target.into(), MappingSource::Parameter(source.into()));
        self
    }

    /// Bind `target` to a literal value
    pub fn literal(mut self, target: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries
            .insert(target.into(), MappingSource::Literal(value.into()));
        self
    }

    /// Parse the compact text form: `"a=${b},c=text"`
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        let mut mapping = Self::new();
        for entry in text.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(DefinitionError::malformed_mapping(entry));
            }
            let Some((target, source)) = entry.split_once('=') else {
                return Err(DefinitionError::malformed_mapping(entry));
            };
            let target = target.trim();
            let source = source.trim();
            if target.is_empty() {
                return Err(DefinitionError::malformed_mapping(entry));
            }
            if let Some(reference) = source.strip_prefix("${") {
                let Some(name) = reference.strip_suffix('}') else {
                    return Err(DefinitionError::malformed_mapping(entry));
                };
                if name.is_empty() {
                    return Err(DefinitionError::malformed_mapping(entry));
                }
                mapping = mapping.map(target, name);
            } else {
                mapping = mapping.literal(target, source);
            }
        }
        Ok(mapping)
    }

    /// Look up the binding for a target parameter
    pub fn get(&self, target: &str) -> Option<&MappingSource> {
        self.entries.get(target)
    }

    /// Iterate bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingSource)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether the mapping has no bindings
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for ParameterMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (target, source)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match source {
                MappingSource::Parameter(name) => write!(f, "{}=${{{}}}", target, name)?,
                MappingSource::Literal(value) => write!(f, "{}={}", target, value)?,
            }
        }
        Ok(())
    }
}

/// A definition paired with the mapping that binds its parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapped<T> {
    /// The wrapped definition
    pub inner: T,
    /// Bindings for the definition's parameters
    pub mappings: ParameterMapping,
}

impl<T> Mapped<T> {
    /// Wrap a definition with parameter bindings
    pub fn new(inner: T, mappings: ParameterMapping) -> Self {
        Self { inner, mappings }
    }

    /// Wrap a definition that needs no bindings
    pub fn unmapped(inner: T) -> Self {
        Self {
            inner,
            mappings: ParameterMapping::new(),
        }
    }
}
