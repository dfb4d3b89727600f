//! Cohort evaluator tests
//!
//! Set semantics of the age, sex, and composition cohort families over a
//! synthetic population, plus the lenient parameter-mapping rules.

use chrono::NaiveDate;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

use pecg_defs::{CohortDefinition, CohortIndicator, Mapped, ParameterMapping};
use pecg_engine::{
    ClinicalStore, EvalError, EvaluationContext, Patient, Sex, evaluate_cohort, evaluate_indicator,
};

// ============================================================================
// Helpers
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Reference date all tests evaluate at
fn effective_date() -> NaiveDate {
    date(2024, 6, 30)
}

/// A patient whose computed age at [`effective_date`] is exactly `years`
fn patient_aged(patient_id: i32, years: i32) -> Patient {
    Patient::new(patient_id).born(date(2024 - years, 1, 1))
}

fn ctx() -> EvaluationContext {
    EvaluationContext::new().with_date("effectiveDate", effective_date())
}

fn ids(set: &BTreeSet<i32>) -> Vec<i32> {
    set.iter().copied().collect()
}

// ============================================================================
// Age cohorts
// ============================================================================

#[test]
fn test_age_range_is_inclusive_on_both_bounds() {
    let mut store = ClinicalStore::new();
    for years in [4, 5, 7, 9, 10] {
        store.add_patient(patient_aged(years, years));
    }

    let band = CohortDefinition::age("5-9", Some(5), Some(9));
    let matched = evaluate_cohort(&store, &band, &ctx()).unwrap();
    assert_eq!(ids(&matched), vec![5, 7, 9]);
}

#[test]
fn test_open_bounds_are_unbounded() {
    let mut store = ClinicalStore::new();
    for years in [0, 49, 50, 99] {
        store.add_patient(patient_aged(years, years));
    }

    let above = CohortDefinition::age("50+", Some(50), None);
    assert_eq!(ids(&evaluate_cohort(&store, &above, &ctx()).unwrap()), vec![50, 99]);

    let below = CohortDefinition::age("<50", None, Some(49));
    assert_eq!(ids(&evaluate_cohort(&store, &below, &ctx()).unwrap()), vec![0, 49]);
}

#[test]
fn test_age_ignores_patients_without_birthdate() {
    let mut store = ClinicalStore::new();
    store.add_patient(patient_aged(1, 30));
    store.add_patient(Patient::new(2));

    let any_age = CohortDefinition::age("any", Some(0), None);
    assert_eq!(ids(&evaluate_cohort(&store, &any_age, &ctx()).unwrap()), vec![1]);
}

#[test]
fn test_age_ignores_voided_patients() {
    let mut store = ClinicalStore::new();
    store.add_patient(patient_aged(1, 30));
    store.add_patient(patient_aged(2, 30).mark_voided());

    let band = CohortDefinition::age("adults", Some(18), None);
    assert_eq!(ids(&evaluate_cohort(&store, &band, &ctx()).unwrap()), vec![1]);
}

#[test]
fn test_age_requires_effective_date() {
    let mut store = ClinicalStore::new();
    store.add_patient(patient_aged(1, 30));

    let band = CohortDefinition::age("adults", Some(18), None);
    let err = evaluate_cohort(&store, &band, &EvaluationContext::new()).unwrap_err();
    assert_eq!(err, EvalError::undefined_parameter("effectiveDate"));
}

#[test]
fn test_negative_max_age_matches_nobody() {
    // A strictly-below-zero cohort: inclusive upper bound of -1.
    let mut store = ClinicalStore::new();
    store.add_patient(patient_aged(1, 0));

    let empty = CohortDefinition::age("below zero", None, Some(-1));
    assert!(evaluate_cohort(&store, &empty, &ctx()).unwrap().is_empty());
}

// ============================================================================
// Sex cohorts
// ============================================================================

#[test]
fn test_sex_flags_direct_matching() {
    let mut store = ClinicalStore::new();
    store.add_patient(Patient::new(1).with_sex(Sex::Male));
    store.add_patient(Patient::new(2).with_sex(Sex::Female));
    store.add_patient(Patient::new(3));

    let males = CohortDefinition::sex("males", true, false);
    let females = CohortDefinition::sex("females", false, true);
    let either = CohortDefinition::sex("either", true, true);
    let neither = CohortDefinition::sex("neither", false, false);

    let ctx = EvaluationContext::new();
    assert_eq!(ids(&evaluate_cohort(&store, &males, &ctx).unwrap()), vec![1]);
    assert_eq!(ids(&evaluate_cohort(&store, &females, &ctx).unwrap()), vec![2]);
    // Patients with unrecorded sex match no flag.
    assert_eq!(ids(&evaluate_cohort(&store, &either, &ctx).unwrap()), vec![1, 2]);
    assert!(evaluate_cohort(&store, &neither, &ctx).unwrap().is_empty());
}

// ============================================================================
// Composition cohorts
// ============================================================================

fn two_search_composition(expression: &str) -> (ClinicalStore, CohortDefinition) {
    let mut store = ClinicalStore::new();
    // 1: young male, 2: young female, 3: old male, 4: old female
    store.add_patient(patient_aged(1, 10).with_sex(Sex::Male));
    store.add_patient(patient_aged(2, 10).with_sex(Sex::Female));
    store.add_patient(patient_aged(3, 60).with_sex(Sex::Male));
    store.add_patient(patient_aged(4, 60).with_sex(Sex::Female));

    let mut searches = IndexMap::new();
    searches.insert(
        "1".to_string(),
        Mapped::new(
            CohortDefinition::age("young", None, Some(18)),
            ParameterMapping::new().map("effectiveDate", "effectiveDate"),
        ),
    );
    searches.insert(
        "2".to_string(),
        Mapped::unmapped(CohortDefinition::sex("males", true, false)),
    );
    (store, CohortDefinition::composition("pair", searches, expression))
}

#[test]
fn test_and_is_set_intersection() {
    let (store, cohort) = two_search_composition("1 and 2");
    assert_eq!(ids(&evaluate_cohort(&store, &cohort, &ctx()).unwrap()), vec![1]);
}

#[test]
fn test_or_is_set_union() {
    let (store, cohort) = two_search_composition("1 or 2");
    assert_eq!(ids(&evaluate_cohort(&store, &cohort, &ctx()).unwrap()), vec![1, 2, 3]);
}

#[test]
fn test_and_or_are_commutative() {
    let (store, forward) = two_search_composition("1 and 2");
    let (_, reversed) = two_search_composition("2 and 1");
    assert_eq!(
        evaluate_cohort(&store, &forward, &ctx()).unwrap(),
        evaluate_cohort(&store, &reversed, &ctx()).unwrap()
    );

    let (_, forward_or) = two_search_composition("1 or 2");
    let (_, reversed_or) = two_search_composition("2 or 1");
    assert_eq!(
        evaluate_cohort(&store, &forward_or, &ctx()).unwrap(),
        evaluate_cohort(&store, &reversed_or, &ctx()).unwrap()
    );
}

#[test]
fn test_not_complements_against_the_universe() {
    let (store, cohort) = two_search_composition("not 2");
    assert_eq!(ids(&evaluate_cohort(&store, &cohort, &ctx()).unwrap()), vec![2, 4]);
}

#[test]
fn test_parentheses_group_subexpressions() {
    let (store, grouped) = two_search_composition("(1 or 2) and 2");
    assert_eq!(ids(&evaluate_cohort(&store, &grouped, &ctx()).unwrap()), vec![1, 3]);
}

#[test]
fn test_unknown_search_key_is_an_error() {
    let (store, cohort) = two_search_composition("1 and 3");
    let err = evaluate_cohort(&store, &cohort, &ctx()).unwrap_err();
    assert_eq!(err, EvalError::unknown_search_key("3"));
}

#[test]
fn test_unbalanced_expression_is_an_error() {
    let (store, cohort) = two_search_composition("(1 and 2");
    assert!(matches!(
        evaluate_cohort(&store, &cohort, &ctx()),
        Err(EvalError::InvalidComposition { .. })
    ));
}

// ============================================================================
// Indicators and parameter mappings
// ============================================================================

#[test]
fn test_indicator_binds_effective_date_to_end_date() {
    let mut store = ClinicalStore::new();
    store.add_patient(patient_aged(1, 10));
    store.add_patient(patient_aged(2, 60));

    let indicator = CohortIndicator::new(
        "young",
        Mapped::new(
            CohortDefinition::age("young", None, Some(18)),
            ParameterMapping::new().map("effectiveDate", "endDate"),
        ),
    );

    let ctx = EvaluationContext::new().with_date("endDate", effective_date());
    assert_eq!(ids(&evaluate_indicator(&store, &indicator, &ctx).unwrap()), vec![1]);
}

#[test]
fn test_unresolved_mapping_errors_only_when_read() {
    let mut store = ClinicalStore::new();
    store.add_patient(patient_aged(1, 10));

    let indicator = CohortIndicator::new(
        "young",
        Mapped::new(
            CohortDefinition::age("young", None, Some(18)),
            ParameterMapping::new().map("effectiveDate", "endDate"),
        ),
    );

    // endDate is unset in the outer scope: the mapping silently binds
    // nothing, and the age cohort's read is what fails.
    let err = evaluate_indicator(&store, &indicator, &EvaluationContext::new()).unwrap_err();
    assert_eq!(err, EvalError::undefined_parameter("effectiveDate"));

    // A sex cohort through the same unresolved mapping reads no parameter
    // at all and evaluates fine.
    let sex_indicator = CohortIndicator::new(
        "males",
        Mapped::new(
            CohortDefinition::sex("males", true, false),
            ParameterMapping::new().map("effectiveDate", "endDate"),
        ),
    );
    assert!(evaluate_indicator(&store, &sex_indicator, &EvaluationContext::new()).is_ok());
}
