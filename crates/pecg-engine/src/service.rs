//! Report service
//!
//! The host reporting engine owns every submitted definition, keyed by
//! name. [`ReportService`] is that boundary; [`InMemoryReportService`] is
//! the self-contained implementation backing tests and the CLI registry
//! file. Save operations deliberately perform no existence check - saving
//! a name twice stores two entries, exactly as the host engine does.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use pecg_defs::{ReportDefinition, ReportDesign};

use crate::{RegistryError, ServiceError};

/// CRUD surface of the host reporting engine, keyed by definition name
pub trait ReportService: Send + Sync {
    /// Persist a report definition
    fn save_report_definition(&self, definition: ReportDefinition) -> Result<(), ServiceError>;

    /// Look up the first report definition with this exact name
    fn report_definition(&self, name: &str) -> Option<ReportDefinition>;

    /// All persisted report definitions, in save order
    fn report_definitions(&self) -> Vec<ReportDefinition>;

    /// Remove every report definition with this exact name
    ///
    /// Returns the number of definitions removed; zero when none matched.
    fn purge_report_definition(&self, name: &str) -> usize;

    /// Persist a render design
    fn save_report_design(&self, design: ReportDesign) -> Result<(), ServiceError>;

    /// All persisted render designs, in save order
    fn report_designs(&self) -> Vec<ReportDesign>;

    /// Remove every render design with this exact name
    ///
    /// Returns the number of designs removed; zero when none matched.
    fn purge_report_design(&self, name: &str) -> usize;
}

/// Everything the service holds, as persisted to the registry file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Saved report definitions, in save order
    pub report_definitions: Vec<ReportDefinition>,
    /// Saved render designs, in save order
    pub report_designs: Vec<ReportDesign>,
}

/// In-memory, shareable report service
#[derive(Clone, Default)]
pub struct InMemoryReportService {
    state: Arc<RwLock<RegistryState>>,
}

impl InMemoryReportService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service holding the given state
    pub fn with_state(state: RegistryState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Load a service from a registry JSON file
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path)?;
        let state: RegistryState = serde_json::from_str(&json)?;
        Ok(Self::with_state(state))
    }

    /// Persist the service state to a registry JSON file
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let json = serde_json::to_string_pretty(&*self.state.read())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Snapshot of the current state
    pub fn state(&self) -> RegistryState {
        self.state.read().clone()
    }
}

impl ReportService for InMemoryReportService {
    fn save_report_definition(&self, definition: ReportDefinition) -> Result<(), ServiceError> {
        self.state.write().report_definitions.push(definition);
        Ok(())
    }

    fn report_definition(&self, name: &str) -> Option<ReportDefinition> {
        self.state
            .read()
            .report_definitions
            .iter()
            .find(|definition| definition.name == name)
            .cloned()
    }

    fn report_definitions(&self) -> Vec<ReportDefinition> {
        self.state.read().report_definitions.clone()
    }

    fn purge_report_definition(&self, name: &str) -> usize {
        let mut state = self.state.write();
        let before = state.report_definitions.len();
        state.report_definitions.retain(|definition| definition.name != name);
        before - state.report_definitions.len()
    }

    fn save_report_design(&self, design: ReportDesign) -> Result<(), ServiceError> {
        self.state.write().report_designs.push(design);
        Ok(())
    }

    fn report_designs(&self) -> Vec<ReportDesign> {
        self.state.read().report_designs.clone()
    }

    fn purge_report_design(&self, name: &str) -> usize {
        let mut state = self.state.write();
        let before = state.report_designs.len();
        state.report_designs.retain(|design| design.name != name);
        before - state.report_designs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pecg_defs::ReportDesign as Design;

    #[test]
    fn test_save_is_append_only() {
        let service = InMemoryReportService::new();
        service
            .save_report_definition(ReportDefinition::new("PECG Report"))
            .unwrap();
        service
            .save_report_definition(ReportDefinition::new("PECG Report"))
            .unwrap();

        // No existence check: two entries share the name.
        assert_eq!(service.report_definitions().len(), 2);
    }

    #[test]
    fn test_purge_matches_exact_name_only() {
        let service = InMemoryReportService::new();
        service
            .save_report_definition(ReportDefinition::new("PECG Report"))
            .unwrap();
        service
            .save_report_definition(ReportDefinition::new("Other Report"))
            .unwrap();

        assert_eq!(service.purge_report_definition("PECG Report"), 1);
        assert_eq!(service.purge_report_definition("PECG Report"), 0);
        assert!(service.report_definition("Other Report").is_some());
    }

    #[test]
    fn test_purge_design_is_noop_when_absent() {
        let service = InMemoryReportService::new();
        assert_eq!(service.purge_report_design("PECG.xls_"), 0);
    }

    #[test]
    fn test_registry_file_round_trip() {
        let service = InMemoryReportService::new();
        service
            .save_report_definition(ReportDefinition::new("PECG Report"))
            .unwrap();
        service
            .save_report_design(
                Design::excel_template("PECG.xls_", "PECG Report", "PECG.xls")
                    .with_property("sortWeight", "5000"),
            )
            .unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        service.save_json_file(file.path()).unwrap();

        let loaded = InMemoryReportService::load_json_file(file.path()).unwrap();
        assert_eq!(loaded.state(), service.state());
    }

    #[test]
    fn test_load_rejects_malformed_registry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        use std::io::Write;
        file.write_all(b"not json").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            InMemoryReportService::load_json_file(file.path()),
            Err(RegistryError::Malformed(_))
        ));
    }
}
