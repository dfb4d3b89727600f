//! Report definitions
//!
//! A report definition names an ordered set of parameters, an optional base
//! population cohort, and the datasets the host engine evaluates for it.
//! The base cohort decides who is eligible at all; dataset indicators are
//! counted within it.

use serde::{Deserialize, Serialize};

use crate::{CohortDefinition, DefinitionError, IndicatorDataSetDefinition, Mapped, Parameter, ParameterMapping};

/// A named, runnable report aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    /// Report name, the host engine's lookup key
    pub name: String,
    /// Declared parameters, in UI order
    pub parameters: Vec<Parameter>,
    /// Base population cohort; `None` means every patient is eligible
    pub base_cohort: Option<Mapped<CohortDefinition>>,
    /// Datasets evaluated for the report, in declaration order
    pub datasets: Vec<Mapped<IndicatorDataSetDefinition>>,
}

impl ReportDefinition {
    /// Create an empty report definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            base_cohort: None,
            datasets: Vec::new(),
        }
    }

    /// Declare a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Set the base population cohort with its parameter bindings
    pub fn set_base_cohort(&mut self, cohort: CohortDefinition, mappings: ParameterMapping) {
        self.base_cohort = Some(Mapped::new(cohort, mappings));
    }

    /// Append a dataset with its parameter bindings
    pub fn add_dataset(&mut self, dataset: IndicatorDataSetDefinition, mappings: ParameterMapping) {
        self.datasets.push(Mapped::new(dataset, mappings));
    }

    /// Check structural invariants, recursing into the base cohort and datasets
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        if let Some(base) = &self.base_cohort {
            base.inner.validate()?;
        }
        for dataset in &self.datasets {
            dataset.inner.validate()?;
        }
        Ok(())
    }
}
