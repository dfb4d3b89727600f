//! Cohort indicators
//!
//! An indicator wraps a cohort definition as a countable measure: its value
//! is the number of patients in the wrapped cohort once the indicator's own
//! parameters are bound through the mapping.

use serde::{Deserialize, Serialize};

use crate::{CohortDefinition, DefinitionError, Mapped, Parameter};

/// A count-producing measure over a cohort definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortIndicator {
    /// Indicator name
    pub name: String,
    /// Parameters the indicator exposes to its enclosing dataset
    pub parameters: Vec<Parameter>,
    /// The cohort being counted, with its parameters bound
    pub cohort: Mapped<CohortDefinition>,
}

impl CohortIndicator {
    /// Wrap a mapped cohort as an indicator with no declared parameters
    pub fn new(name: impl Into<String>, cohort: Mapped<CohortDefinition>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            cohort,
        }
    }

    /// Declare a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Check structural invariants
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        self.cohort.inner.validate()
    }
}
