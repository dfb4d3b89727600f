//! Evaluation context
//!
//! Holds the parameter values a definition is evaluated with. Nested
//! definitions get a child context built through their parameter mapping;
//! resolution is lenient - a reference to a parameter the parent does not
//! hold leaves the target unset, and an error surfaces only if a definition
//! actually reads an unset parameter.

use chrono::NaiveDate;
use std::collections::HashMap;

use pecg_defs::{MappingSource, ParameterMapping};

use crate::{EvalError, EvalResult};

/// A parameter value bound at evaluation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// Calendar date
    Date(NaiveDate),
    /// Whole number
    Integer(i64),
    /// Free text
    Text(String),
}

/// Parameter values for one evaluation
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    parameters: HashMap<String, ParameterValue>,
}

impl EvaluationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a parameter, builder style
    pub fn with_parameter(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Bind a date parameter, builder style
    pub fn with_date(self, name: impl Into<String>, date: NaiveDate) -> Self {
        self.with_parameter(name, ParameterValue::Date(date))
    }

    /// Bind a parameter
    pub fn set_parameter(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.parameters.insert(name.into(), value);
    }

    /// Look up a parameter value
    pub fn get_parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }

    /// Read a date parameter, erring when unset or of another type
    pub fn date(&self, name: &str) -> EvalResult<NaiveDate> {
        match self.get_parameter(name) {
            Some(ParameterValue::Date(date)) => Ok(*date),
            Some(_) => Err(EvalError::parameter_type(name, "date")),
            None => Err(EvalError::undefined_parameter(name)),
        }
    }

    /// Build the context a nested definition is evaluated with
    ///
    /// Each mapping entry binds one target parameter: literals bind as
    /// text, references copy the named parameter from this context when it
    /// is set and bind nothing when it is not.
    pub fn child(&self, mappings: &ParameterMapping) -> Self {
        let mut child = Self::new();
        for (target, source) in mappings.iter() {
            match source {
                MappingSource::Parameter(name) => {
                    if let Some(value) = self.get_parameter(name) {
                        child.set_parameter(target, value.clone());
                    }
                }
                MappingSource::Literal(value) => {
                    child.set_parameter(target, ParameterValue::Text(value.clone()));
                }
            }
        }
        child
    }
}
