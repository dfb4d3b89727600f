//! Cohort definitions
//!
//! A cohort definition is a named, parameterized predicate over a patient
//! population. The downstream evaluator turns it into a boolean
//! patient-membership set; this crate only describes the predicate.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{DefinitionError, Mapped, Parameter, expression_keys};

/// A named, parameterized patient-population predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortDefinition {
    /// Definition name
    pub name: String,
    /// Parameters the predicate expects at evaluation time
    pub parameters: Vec<Parameter>,
    /// The predicate itself
    pub kind: CohortKind,
}

/// The supported predicate families
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CohortKind {
    /// Computed-age range at a reference date
    Age(AgeCohort),
    /// Recorded sex
    Sex(SexCohort),
    /// Raw query template with named `:placeholders`
    Sql(SqlCohort),
    /// Boolean combination of keyed sub-cohorts
    Composition(CompositionCohort),
}

/// Age range in whole years at an `effectiveDate` reference date
///
/// Both bounds are inclusive when present. An absent bound is unbounded on
/// that side. Bounds are signed so that strictly-below-N cohorts can be
/// written as `max_age = N - 1` even for N = 0, which no computed age
/// satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeCohort {
    /// Minimum age in years, inclusive
    pub min_age: Option<i32>,
    /// Maximum age in years, inclusive
    pub max_age: Option<i32>,
}

/// Recorded-sex predicate with independent flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SexCohort {
    /// Match patients recorded male
    pub male_included: bool,
    /// Match patients recorded female
    pub female_included: bool,
}

/// Raw query predicate, interpreted by the evaluating engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlCohort {
    /// Query template with named `:placeholders` for the parameters
    pub query: String,
}

/// Boolean combination of keyed sub-cohorts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionCohort {
    /// Sub-cohorts by search key, in declaration order
    pub searches: IndexMap<String, Mapped<CohortDefinition>>,
    /// Boolean expression over the search keys, e.g. `"1 and 2"`
    pub expression: String,
}

impl CohortDefinition {
    /// Create a definition with no parameters
    pub fn new(name: impl Into<String>, kind: CohortKind) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            kind,
        }
    }

    /// Create an age-range definition
    pub fn age(name: impl Into<String>, min_age: Option<i32>, max_age: Option<i32>) -> Self {
        Self::new(name, CohortKind::Age(AgeCohort { min_age, max_age }))
    }

    /// Create a sex definition
    pub fn sex(name: impl Into<String>, male_included: bool, female_included: bool) -> Self {
        Self::new(
            name,
            CohortKind::Sex(SexCohort {
                male_included,
                female_included,
            }),
        )
    }

    /// Create a raw-query definition
    pub fn sql(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self::new(
            name,
            CohortKind::Sql(SqlCohort {
                query: query.into(),
            }),
        )
    }

    /// Create a composition over keyed sub-cohorts
    pub fn composition(
        name: impl Into<String>,
        searches: IndexMap<String, Mapped<CohortDefinition>>,
        expression: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            CohortKind::Composition(CompositionCohort {
                searches,
                expression: expression.into(),
            }),
        )
    }

    /// Declare a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Check structural invariants, recursing into composition searches
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        match &self.kind {
            CohortKind::Age(age) => {
                if let (Some(min), Some(max)) = (age.min_age, age.max_age) {
                    if min > max {
                        return Err(DefinitionError::InvalidAgeRange { min, max });
                    }
                }
            }
            CohortKind::Sex(_) | CohortKind::Sql(_) => {}
            CohortKind::Composition(composition) => {
                if composition.searches.is_empty() {
                    return Err(DefinitionError::EmptyComposition {
                        name: self.name.clone(),
                    });
                }
                if composition.expression.trim().is_empty() {
                    return Err(DefinitionError::EmptyExpression {
                        name: self.name.clone(),
                    });
                }
                for key in expression_keys(&composition.expression) {
                    if !composition.searches.contains_key(&key) {
                        return Err(DefinitionError::unknown_search_key(
                            key,
                            &composition.expression,
                        ));
                    }
                }
                for mapped in composition.searches.values() {
                    mapped.inner.validate()?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParameterMapping;

    fn search(definition: CohortDefinition) -> Mapped<CohortDefinition> {
        Mapped::unmapped(definition)
    }

    #[test]
    fn test_age_bounds_validate() {
        assert!(CohortDefinition::age("ok", Some(1), Some(4)).validate().is_ok());
        assert!(CohortDefinition::age("equal", Some(5), Some(5)).validate().is_ok());
        assert!(CohortDefinition::age("open", Some(50), None).validate().is_ok());

        let err = CohortDefinition::age("bad", Some(10), Some(4)).validate().unwrap_err();
        assert_eq!(err, DefinitionError::InvalidAgeRange { min: 10, max: 4 });
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = CohortDefinition::sex("", true, false).validate().unwrap_err();
        assert_eq!(err, DefinitionError::EmptyName);
    }

    #[test]
    fn test_composition_expression_keys_must_exist() {
        let mut searches = IndexMap::new();
        searches.insert("1".to_string(), search(CohortDefinition::sex("males", true, false)));

        let bad = CohortDefinition::composition("pair", searches.clone(), "1 and 2");
        assert!(matches!(
            bad.validate(),
            Err(DefinitionError::UnknownSearchKey { key, .. }) if key == "2"
        ));

        searches.insert("2".to_string(), search(CohortDefinition::sex("females", false, true)));
        let good = CohortDefinition::composition("pair", searches, "1 and 2");
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_composition_requires_searches_and_expression() {
        let empty = CohortDefinition::composition("none", IndexMap::new(), "1");
        assert!(matches!(empty.validate(), Err(DefinitionError::EmptyComposition { .. })));

        let mut searches = IndexMap::new();
        searches.insert("1".to_string(), search(CohortDefinition::sex("males", true, false)));
        let blank = CohortDefinition::composition("blank", searches, "  ");
        assert!(matches!(blank.validate(), Err(DefinitionError::EmptyExpression { .. })));
    }

    #[test]
    fn test_validate_recurses_into_searches() {
        let mut searches = IndexMap::new();
        searches.insert(
            "1".to_string(),
            Mapped::new(
                CohortDefinition::age("inverted", Some(9), Some(5)),
                ParameterMapping::new().map("effectiveDate", "effectiveDate"),
            ),
        );
        let composition = CohortDefinition::composition("outer", searches, "1");
        assert!(matches!(
            composition.validate(),
            Err(DefinitionError::InvalidAgeRange { .. })
        ));
    }

    #[test]
    fn test_constructors_return_fresh_instances() {
        let a = CohortDefinition::age("band", Some(1), Some(4));
        let mut b = CohortDefinition::age("band", Some(1), Some(4));
        b.name = "renamed".to_string();
        assert_eq!(a.name, "band");
    }

    #[test]
    fn test_search_order_survives_serialization() {
        let mut searches = IndexMap::new();
        searches.insert("2".to_string(), search(CohortDefinition::sex("females", false, true)));
        searches.insert("1".to_string(), search(CohortDefinition::sex("males", true, false)));
        let composition = CohortDefinition::composition("pair", searches, "2 and 1");

        let json = serde_json::to_string(&composition).unwrap();
        let loaded: CohortDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, composition);

        let CohortKind::Composition(inner) = &loaded.kind else {
            panic!("expected a composition");
        };
        let keys: Vec<&str> = inner.searches.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2", "1"]);
    }
}
