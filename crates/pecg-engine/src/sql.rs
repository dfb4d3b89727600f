//! Enrollment-visit query matcher
//!
//! The engine does not plan SQL. It interprets exactly one query family:
//! the visit-plus-enrollment predicate the cohort library generates for the
//! base population, recognized structurally and evaluated against the
//! in-memory store. Anything else is rejected.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::ClinicalStore;

/// Window-start parameter of the base-population query
pub const ON_OR_AFTER: &str = "onOrAfter";

/// Window-end parameter of the base-population query
pub const ON_OR_BEFORE: &str = "onOrBefore";

static VISIT_TYPE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"v\.visit_type_id\s*=\s*(\d+)").expect("visit type pattern"));
static PROGRAM_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pp\.program_id\s*=\s*(\d+)").expect("program pattern"));

/// The one query family the engine interprets: patients with a qualifying
/// visit in the reporting window and an overlapping program enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrollmentVisitQuery {
    /// Program the enrollment must belong to
    pub program_id: i32,
    /// Visit type the qualifying visit must have
    pub visit_type_id: i32,
}

impl EnrollmentVisitQuery {
    /// Recognize the query family and extract its identifiers
    ///
    /// Returns `None` for any query that does not join visits to program
    /// enrollments with both window placeholders present.
    pub fn parse(query: &str) -> Option<Self> {
        if !query.contains("visit") || !query.contains("patient_program") {
            return None;
        }
        if !query.contains(":onOrAfter") || !query.contains(":onOrBefore") {
            return None;
        }
        let visit_type_id = VISIT_TYPE_ID.captures(query)?.get(1)?.as_str().parse().ok()?;
        let program_id = PROGRAM_ID.captures(query)?.get(1)?.as_str().parse().ok()?;
        Some(Self {
            program_id,
            visit_type_id,
        })
    }

    /// Patients with at least one qualifying visit in the window and an
    /// overlapping, non-voided enrollment
    ///
    /// A visit qualifies when it is not voided, has the configured type,
    /// and started within `[on_or_after, on_or_before]`. An enrollment
    /// overlaps when it is not voided, was entered on or before the window
    /// end, and either has no completion date or completed on or after the
    /// window start.
    pub fn evaluate(
        &self,
        store: &ClinicalStore,
        on_or_after: NaiveDate,
        on_or_before: NaiveDate,
    ) -> BTreeSet<i32> {
        let enrolled: BTreeSet<i32> = store
            .enrollments()
            .iter()
            .filter(|enrollment| {
                !enrollment.voided
                    && enrollment.program_id == self.program_id
                    && enrollment.date_enrolled <= on_or_before
                    && enrollment
                        .date_completed
                        .is_none_or(|completed| completed >= on_or_after)
            })
            .map(|enrollment| enrollment.patient_id)
            .collect();

        store
            .visits()
            .iter()
            .filter(|visit| {
                !visit.voided
                    && visit.visit_type_id == self.visit_type_id
                    && visit.date_started >= on_or_after
                    && visit.date_started <= on_or_before
            })
            .map(|visit| visit.patient_id)
            .filter(|patient_id| enrolled.contains(patient_id))
            .collect()
    }
}
