//! Cohort library
//!
//! Every function returns a fresh definition; nothing here is shared or
//! cached, so callers may rename and rebind instances freely.

use indexmap::IndexMap;
use pecg_defs::{CohortDefinition, Mapped, Parameter, ParameterMapping};
use pecg_engine::{Program, VisitType};

/// Patients recorded male
pub fn males() -> CohortDefinition {
    CohortDefinition::sex("male Patients", true, false)
}

/// Patients recorded female
pub fn females() -> CohortDefinition {
    CohortDefinition::sex("female Patients", false, true)
}

/// Patients with computed age strictly below `age` years at the
/// `effectiveDate` reference date
///
/// Encoded with an inclusive upper bound of `age - 1`; for `age = 0` the
/// bound is -1, which no computed age satisfies.
pub fn age_below(age: i32) -> CohortDefinition {
    CohortDefinition::age("patientsWithAgeBelow", None, Some(age - 1))
        .with_parameter(Parameter::date("effectiveDate", "effectiveDate"))
}

/// Patients with computed age of at least `age` years at the
/// `effectiveDate` reference date
pub fn age_above(age: i32) -> CohortDefinition {
    CohortDefinition::age("patientsWithAgeAbove", Some(age), None)
        .with_parameter(Parameter::date("effectiveDate", "effectiveDate"))
}

/// Patients aged between `min_age` and `max_age` years inclusive at the
/// `effectiveDate` reference date
pub fn age_range(name: impl Into<String>, min_age: i32, max_age: i32) -> CohortDefinition {
    CohortDefinition::age(name, Some(min_age), Some(max_age))
        .with_parameter(Parameter::date("effectiveDate", "effectiveDate"))
}

/// Patients in the given age band with the given recorded sex
pub fn in_age_range_by_sex(age_band: CohortDefinition, sex: CohortDefinition) -> CohortDefinition {
    let mut searches = IndexMap::new();
    searches.insert(
        "1".to_string(),
        Mapped::new(
            age_band,
            ParameterMapping::new().map("effectiveDate", "effectiveDate"),
        ),
    );
    searches.insert("2".to_string(), Mapped::unmapped(sex));
    CohortDefinition::composition("patientsInAgeRangeBySex", searches, "1 and 2")
        .with_parameter(Parameter::date("effectiveDate", "effectiveDate"))
}

/// Patients with either recorded sex
pub fn all_by_sex(males: CohortDefinition, females: CohortDefinition) -> CohortDefinition {
    let mut searches = IndexMap::new();
    searches.insert("1".to_string(), Mapped::unmapped(males));
    searches.insert("2".to_string(), Mapped::unmapped(females));
    CohortDefinition::composition("patientsOfEitherSex", searches, "1 or 2")
        .with_parameter(Parameter::date("effectiveDate", "effectiveDate"))
}

/// The fixed ordered age bands the report is broken down by:
/// <1, 1-4, 5-9, 10-14, 15-19, 20-24, 25-49, >=50
///
/// The order is significant - it fixes dataset column order and keys.
pub fn standard_age_bands() -> Vec<CohortDefinition> {
    let mut below_one = age_below(1);
    below_one.name = "PatientBelow1Year".to_string();
    let mut fifty_and_above = age_above(50);
    fifty_and_above.name = "PatientBetween50YearsAndAbove".to_string();

    vec![
        below_one,
        age_range("PatientBetween1And4Years", 1, 4),
        age_range("PatientBetween5And9Years", 5, 9),
        age_range("PatientBetween10And14Years", 10, 14),
        age_range("PatientBetween15And19Years", 15, 19),
        age_range("PatientBetween20And24Years", 20, 24),
        age_range("PatientBetween25And49Years", 25, 49),
        fifty_and_above,
    ]
}

/// The base population: patients with at least one visit of the given type
/// in the reporting window and an overlapping enrollment in the given
/// program
pub fn enrolled_in_program_with_visit(program: &Program, visit_type: &VisitType) -> CohortDefinition {
    let query = format!(
        "select v.patient_id from visit v,patient_program pp \
         where v.visit_type_id={} and v.patient_id=pp.patient_id and pp.program_id={} \
         and pp.voided=0 and pp.date_enrolled <= :onOrBefore \
         and (pp.date_completed >= :onOrAfter or pp.date_completed is null) \
         and v.voided=0 and v.date_started >= :onOrAfter and v.date_started <= :onOrBefore",
        visit_type.visit_type_id, program.program_id
    );
    CohortDefinition::sql("patientsEnrolledInProgramWithVisit", query)
        .with_parameter(Parameter::date("onOrAfter", "onOrAfter"))
        .with_parameter(Parameter::date("onOrBefore", "onOrBefore"))
}
