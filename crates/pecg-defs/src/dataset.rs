//! Indicator datasets
//!
//! A dataset lays indicators out as named columns. Column order is
//! insertion order and is significant: the render design addresses the
//! dataset positionally.

use serde::{Deserialize, Serialize};

use crate::{CohortIndicator, DefinitionError, Mapped, Parameter};

/// One column of an indicator dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetColumn {
    /// Column key, unique within the dataset
    pub key: String,
    /// Human-readable column label
    pub label: String,
    /// The indicator backing the column, with its parameters bound
    pub indicator: Mapped<CohortIndicator>,
}

/// A named, parameterized tabular arrangement of indicator columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorDataSetDefinition {
    /// Dataset name
    pub name: String,
    /// Parameters the dataset exposes to its enclosing report
    pub parameters: Vec<Parameter>,
    columns: Vec<DataSetColumn>,
}

impl IndicatorDataSetDefinition {
    /// Create an empty dataset
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Declare a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Append a column; the key must not already be present
    pub fn add_column(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        indicator: Mapped<CohortIndicator>,
    ) -> Result<(), DefinitionError> {
        let key = key.into();
        if self.columns.iter().any(|column| column.key == key) {
            return Err(DefinitionError::DuplicateColumn { key });
        }
        self.columns.push(DataSetColumn {
            key,
            label: label.into(),
            indicator,
        });
        Ok(())
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[DataSetColumn] {
        &self.columns
    }

    /// Check structural invariants, recursing into column indicators
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        for column in &self.columns {
            column.indicator.inner.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CohortDefinition, ParameterMapping};

    fn indicator(name: &str) -> Mapped<CohortIndicator> {
        Mapped::new(
            CohortIndicator::new(name, Mapped::unmapped(CohortDefinition::sex("males", true, false))),
            ParameterMapping::new(),
        )
    }

    #[test]
    fn test_duplicate_column_key_rejected() {
        let mut dataset = IndicatorDataSetDefinition::new("Data Set");
        dataset.add_column("2All", "All patients", indicator("all")).unwrap();

        let err = dataset.add_column("2All", "All again", indicator("all")).unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateColumn { key: "2All".to_string() });
        assert_eq!(dataset.columns().len(), 1);
    }

    #[test]
    fn test_columns_keep_insertion_order() {
        let mut dataset = IndicatorDataSetDefinition::new("Data Set");
        for key in ["2M0", "2F0", "2All"] {
            dataset.add_column(key, key, indicator(key)).unwrap();
        }
        let keys: Vec<&str> = dataset.columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["2M0", "2F0", "2All"]);
    }
}
