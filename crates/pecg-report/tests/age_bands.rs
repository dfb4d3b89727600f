//! Age band tests
//!
//! The eight standard bands partition every age, the below/above pair is
//! complementary, and range boundaries are inclusive.

use chrono::NaiveDate;
use pecg_engine::{ClinicalStore, EvaluationContext, Patient, evaluate_cohort};
use pecg_report::library::cohorts;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn effective_date() -> NaiveDate {
    date(2024, 6, 30)
}

/// One patient per age from 0 to 120, patient id == age
fn population() -> ClinicalStore {
    let mut store = ClinicalStore::new();
    for years in 0..=120 {
        store.add_patient(Patient::new(years).born(date(2024 - years, 1, 1)));
    }
    store
}

fn ctx() -> EvaluationContext {
    EvaluationContext::new().with_date("effectiveDate", effective_date())
}

#[test]
fn test_standard_bands_are_eight_in_fixed_order() {
    let names: Vec<String> = cohorts::standard_age_bands()
        .into_iter()
        .map(|band| band.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "PatientBelow1Year",
            "PatientBetween1And4Years",
            "PatientBetween5And9Years",
            "PatientBetween10And14Years",
            "PatientBetween15And19Years",
            "PatientBetween20And24Years",
            "PatientBetween25And49Years",
            "PatientBetween50YearsAndAbove",
        ]
    );
}

#[test]
fn test_bands_partition_every_age() {
    let store = population();
    let bands = cohorts::standard_age_bands();

    for age in 0..=120 {
        let matching: Vec<&str> = bands
            .iter()
            .filter(|band| {
                evaluate_cohort(&store, band, &ctx()).unwrap().contains(&age)
            })
            .map(|band| band.name.as_str())
            .collect();
        assert_eq!(matching.len(), 1, "age {} matched bands {:?}", age, matching);
    }
}

#[test]
fn test_band_boundaries() {
    let store = population();
    let bands = cohorts::standard_age_bands();

    let below_one = evaluate_cohort(&store, &bands[0], &ctx()).unwrap();
    assert!(below_one.contains(&0));
    assert!(!below_one.contains(&1));

    let one_to_four = evaluate_cohort(&store, &bands[1], &ctx()).unwrap();
    assert!(one_to_four.contains(&1));
    assert!(one_to_four.contains(&4));
    assert!(!one_to_four.contains(&5));

    let fifty_up = evaluate_cohort(&store, &bands[7], &ctx()).unwrap();
    assert!(!fifty_up.contains(&49));
    assert!(fifty_up.contains(&50));
    assert!(fifty_up.contains(&120));
}

#[test]
fn test_age_below_and_above_are_complementary() {
    let store = population();
    let universe = store.patient_universe();

    for age in 0..=120 {
        let below = evaluate_cohort(&store, &cohorts::age_below(age), &ctx()).unwrap();
        let above = evaluate_cohort(&store, &cohorts::age_above(age), &ctx()).unwrap();

        assert!(below.is_disjoint(&above), "overlap at age {}", age);
        let union: std::collections::BTreeSet<i32> = below.union(&above).copied().collect();
        assert_eq!(union, universe, "gap at age {}", age);
        assert!(below.iter().all(|id| *id < age));
        assert!(above.iter().all(|id| *id >= age));
    }
}

#[test]
fn test_age_range_includes_both_boundaries() {
    let store = population();
    let range = cohorts::age_range("5-9", 5, 9);
    let matched = evaluate_cohort(&store, &range, &ctx()).unwrap();

    assert!(matched.contains(&5));
    assert!(matched.contains(&9));
    assert!(!matched.contains(&4));
    assert!(!matched.contains(&10));
}

#[test]
fn test_band_definitions_validate() {
    for band in cohorts::standard_age_bands() {
        band.validate().unwrap();
    }
}
