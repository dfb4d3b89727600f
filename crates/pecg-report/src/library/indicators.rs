//! Indicator library
//!
//! Every indicator declares `startDate` and `endDate` and binds its
//! cohort's `effectiveDate` to `${endDate}`: the age/sex breakdowns are
//! cross-sectional counts as of the window end. Only the report's base
//! population is windowed by both dates.

use pecg_defs::{CohortDefinition, CohortIndicator, Mapped, Parameter, ParameterMapping};

use crate::library::cohorts;

/// Wrap a cohort as an indicator with the standard date parameters
pub fn cohort_indicator(
    name: impl Into<String>,
    cohort: CohortDefinition,
    mappings: ParameterMapping,
) -> CohortIndicator {
    CohortIndicator::new(name, Mapped::new(cohort, mappings))
        .with_parameter(Parameter::date("startDate", "Start date"))
        .with_parameter(Parameter::date("endDate", "End date"))
}

fn as_of_end_date() -> ParameterMapping {
    ParameterMapping::new().map("effectiveDate", "endDate")
}

/// Patients below 1 year
pub fn below_1_year() -> CohortIndicator {
    cohort_indicator("patientBelow1YearIndicator", cohorts::age_below(1), as_of_end_date())
}

/// Patients between 1 and 4 years
pub fn between_1_and_4_years() -> CohortIndicator {
    cohort_indicator(
        "patientBetween1And4YearsIndicator",
        cohorts::age_range("PatientBetween1And4Years", 1, 4),
        as_of_end_date(),
    )
}

/// Patients between 5 and 9 years
pub fn between_5_and_9_years() -> CohortIndicator {
    cohort_indicator(
        "patientBetween5And9YearsIndicator",
        cohorts::age_range("PatientBetween5And9Years", 5, 9),
        as_of_end_date(),
    )
}

/// Patients between 10 and 14 years
pub fn between_10_and_14_years() -> CohortIndicator {
    cohort_indicator(
        "patientBetween10And14YearsIndicator",
        cohorts::age_range("PatientBetween10And14Years", 10, 14),
        as_of_end_date(),
    )
}

/// Patients between 15 and 19 years
pub fn between_15_and_19_years() -> CohortIndicator {
    cohort_indicator(
        "patientBetween15And19YearsIndicator",
        cohorts::age_range("PatientBetween15And19Years", 15, 19),
        as_of_end_date(),
    )
}

/// Patients between 20 and 24 years
pub fn between_20_and_24_years() -> CohortIndicator {
    cohort_indicator(
        "patientBetween20And24YearsIndicator",
        cohorts::age_range("PatientBetween20And24Years", 20, 24),
        as_of_end_date(),
    )
}

/// Patients between 25 and 49 years
pub fn between_25_and_49_years() -> CohortIndicator {
    cohort_indicator(
        "patientBetween25And49YearsIndicator",
        cohorts::age_range("PatientBetween25And49Years", 25, 49),
        as_of_end_date(),
    )
}

/// Patients of 50 years and above
pub fn above_50_years() -> CohortIndicator {
    cohort_indicator("patientBetween50AndAboveIndicator", cohorts::age_above(50), as_of_end_date())
}

/// Patients in the given age band with the given recorded sex
pub fn in_age_range_by_sex(age_band: CohortDefinition, sex: CohortDefinition) -> CohortIndicator {
    cohort_indicator(
        "patientInAgeRangeBySexIndicator",
        cohorts::in_age_range_by_sex(age_band, sex),
        as_of_end_date(),
    )
}

/// Patients of either recorded sex
pub fn all_patients() -> CohortIndicator {
    cohort_indicator(
        "allPatientsIndicator",
        cohorts::all_by_sex(cohorts::males(), cohorts::females()),
        as_of_end_date(),
    )
}
