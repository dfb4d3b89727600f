//! Definition validation errors

use thiserror::Error;

/// Errors raised while building or validating report definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A definition was given an empty name
    #[error("Definition name must not be empty")]
    EmptyName,

    /// An age cohort with both bounds set has min above max
    #[error("Invalid age range: min {min} exceeds max {max}")]
    InvalidAgeRange { min: i32, max: i32 },

    /// A composition expression references a key with no matching search
    #[error("Expression '{expression}' references unknown search key '{key}'")]
    UnknownSearchKey { key: String, expression: String },

    /// A composition has no searches
    #[error("Composition '{name}' declares no searches")]
    EmptyComposition { name: String },

    /// A composition has a blank expression
    #[error("Composition '{name}' has an empty expression")]
    EmptyExpression { name: String },

    /// A dataset column key was added twice
    #[error("Duplicate dataset column key '{key}'")]
    DuplicateColumn { key: String },

    /// A parameter mapping entry could not be parsed
    #[error("Malformed parameter mapping entry '{entry}'")]
    MalformedMapping { entry: String },
}

impl DefinitionError {
    /// Create an unknown-search-key error
    pub fn unknown_search_key(key: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::UnknownSearchKey {
            key: key.into(),
            expression: expression.into(),
        }
    }

    /// Create a malformed-mapping error
    pub fn malformed_mapping(entry: impl Into<String>) -> Self {
        Self::MalformedMapping {
            entry: entry.into(),
        }
    }
}
