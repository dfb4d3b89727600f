//! Engine error types

use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while evaluating definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A definition read a parameter the context does not hold
    #[error("Undefined parameter: {name}")]
    UndefinedParameter { name: String },

    /// A parameter held a value of the wrong type
    #[error("Parameter '{name}' is not a {expected}")]
    ParameterType { name: String, expected: String },

    /// A composition expression referenced a key with no matching search
    #[error("Unknown search key: {key}")]
    UnknownSearchKey { key: String },

    /// A composition expression could not be parsed
    #[error("Invalid composition expression '{expression}': {reason}")]
    InvalidComposition { expression: String, reason: String },

    /// A SQL cohort used a query family the engine does not interpret
    #[error("Unsupported query in cohort '{name}'")]
    UnsupportedQuery { name: String },
}

impl EvalError {
    /// Create an undefined-parameter error
    pub fn undefined_parameter(name: impl Into<String>) -> Self {
        Self::UndefinedParameter { name: name.into() }
    }

    /// Create a parameter-type error
    pub fn parameter_type(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ParameterType {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Create an unknown-search-key error
    pub fn unknown_search_key(key: impl Into<String>) -> Self {
        Self::UnknownSearchKey { key: key.into() }
    }

    /// Create an invalid-composition error
    pub fn invalid_composition(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidComposition {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported-query error
    pub fn unsupported_query(name: impl Into<String>) -> Self {
        Self::UnsupportedQuery { name: name.into() }
    }
}

/// Errors from the report service boundary
///
/// The in-memory service never fails, but the trait mirrors a host engine
/// whose persistence layer can; failures propagate to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The backing store rejected the operation
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors while loading or persisting the registry file
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid registry document
    #[error("Malformed registry: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors while loading a clinical bundle
#[derive(Debug, Error)]
pub enum BundleError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid clinical bundle
    #[error("Malformed bundle: {0}")]
    Malformed(#[from] serde_json::Error),
}
