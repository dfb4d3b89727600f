//! In-memory clinical store
//!
//! Stands in for the host platform's database: holds the patients, visits,
//! enrollments, and reference entities the cohorts and the setup entry
//! point read. Serializable so a whole clinical bundle can be loaded from
//! JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::{BundleError, Patient, Program, ProgramEnrollment, Visit, VisitType};

/// Lookup surface for the two external references the setup entry point
/// resolves at call time
pub trait ClinicalCatalog {
    /// Look up a program by its numeric identifier
    fn program_by_id(&self, program_id: i32) -> Option<Program>;

    /// Look up a visit type by its stable external identifier
    fn visit_type_by_uuid(&self, uuid: &str) -> Option<VisitType>;
}

/// In-memory clinical record collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalStore {
    programs: Vec<Program>,
    visit_types: Vec<VisitType>,
    patients: Vec<Patient>,
    visits: Vec<Visit>,
    enrollments: Vec<ProgramEnrollment>,
}

impl ClinicalStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a clinical bundle from a JSON string
    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a clinical bundle from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add a program
    pub fn add_program(&mut self, program: Program) {
        self.programs.push(program);
    }

    /// Add a visit type
    pub fn add_visit_type(&mut self, visit_type: VisitType) {
        self.visit_types.push(visit_type);
    }

    /// Add a patient
    pub fn add_patient(&mut self, patient: Patient) {
        self.patients.push(patient);
    }

    /// Add a visit
    pub fn add_visit(&mut self, visit: Visit) {
        self.visits.push(visit);
    }

    /// Add a program enrollment
    pub fn add_enrollment(&mut self, enrollment: ProgramEnrollment) {
        self.enrollments.push(enrollment);
    }

    /// All patient records, voided included
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// All visit records, voided included
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// All enrollment records, voided included
    pub fn enrollments(&self) -> &[ProgramEnrollment] {
        &self.enrollments
    }

    /// Identifiers of every unvoided patient - the evaluation universe
    pub fn patient_universe(&self) -> BTreeSet<i32> {
        self.patients
            .iter()
            .filter(|patient| !patient.voided)
            .map(|patient| patient.patient_id)
            .collect()
    }
}

impl ClinicalCatalog for ClinicalStore {
    fn program_by_id(&self, program_id: i32) -> Option<Program> {
        self.programs
            .iter()
            .find(|program| program.program_id == program_id)
            .cloned()
    }

    fn visit_type_by_uuid(&self, uuid: &str) -> Option<VisitType> {
        self.visit_types
            .iter()
            .find(|visit_type| visit_type.uuid == uuid)
            .cloned()
    }
}
