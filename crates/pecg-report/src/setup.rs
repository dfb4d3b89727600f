//! Setup and teardown of the PECG report
//!
//! `setup` resolves the program and visit type the report is scoped to,
//! assembles the report definition with its 25-column dataset and the
//! spreadsheet render design, and persists both through the report
//! service. `delete` purges both by name. Setup performs no existence
//! check: calling it twice registers two definitions with the same name,
//! matching the host engine's append-only save semantics.

use log::info;
use thiserror::Error;

use pecg_defs::{
    DefinitionError, IndicatorDataSetDefinition, Mapped, Parameter, ParameterMapping,
    ReportDefinition, ReportDesign,
};
use pecg_engine::{ClinicalCatalog, Program, ReportService, ServiceError, VisitType};

use crate::library::{cohorts, indicators};

/// Name the report definition is registered and purged under
pub const REPORT_NAME: &str = "PECG Report";

/// Name of the report's one dataset
pub const DATASET_NAME: &str = "PECG Data Set";

/// Name the render design is registered and purged under
pub const DESIGN_NAME: &str = "PECG.xls_";

/// Spreadsheet template resource the design fills
pub const TEMPLATE_RESOURCE: &str = "PECG.xls";

/// Program the report is scoped to unless configured otherwise
pub const DEFAULT_PROGRAM_ID: i32 = 1;

/// Visit type the base population requires unless configured otherwise
pub const DEFAULT_VISIT_TYPE_UUID: &str = "a7c2aaf0-c4e5-4310-aa94-07c7fe6a331a";

const REPEATING_SECTIONS: &str = "sheet:1,dataset:PECG Data Set";
const SORT_WEIGHT: &str = "5000";

/// External references the report is built against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PecgReportConfig {
    /// Numeric identifier of the clinical program
    pub program_id: i32,
    /// Stable identifier of the qualifying visit type
    pub visit_type_uuid: String,
}

impl Default for PecgReportConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            visit_type_uuid: DEFAULT_VISIT_TYPE_UUID.to_string(),
        }
    }
}

/// Errors raised by setup
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configured program does not exist in the catalog
    #[error("Program {0} not found")]
    ProgramNotFound(i32),

    /// The configured visit type does not exist in the catalog
    #[error("Visit type {0} not found")]
    VisitTypeNotFound(String),

    /// A definition failed validation while being assembled
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// The report service rejected a save
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Registers and removes the PECG report
#[derive(Debug, Clone, Default)]
pub struct SetupPecgReport {
    config: PecgReportConfig,
}

impl SetupPecgReport {
    /// Create a setup entry point with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a setup entry point with explicit external references
    pub fn with_config(config: PecgReportConfig) -> Self {
        Self { config }
    }

    /// The configured external references
    pub fn config(&self) -> &PecgReportConfig {
        &self.config
    }

    /// Assemble and register the report definition and its render design
    ///
    /// Both external references are resolved before anything is persisted,
    /// so a missing program or visit type leaves the service untouched.
    pub fn setup(
        &self,
        catalog: &dyn ClinicalCatalog,
        service: &dyn ReportService,
    ) -> Result<ReportDefinition, SetupError> {
        let program = catalog
            .program_by_id(self.config.program_id)
            .ok_or(SetupError::ProgramNotFound(self.config.program_id))?;
        let visit_type = catalog
            .visit_type_by_uuid(&self.config.visit_type_uuid)
            .ok_or_else(|| SetupError::VisitTypeNotFound(self.config.visit_type_uuid.clone()))?;

        let report = self.build_report_definition(&program, &visit_type)?;
        service.save_report_definition(report.clone())?;

        let design = ReportDesign::excel_template(DESIGN_NAME, REPORT_NAME, TEMPLATE_RESOURCE)
            .with_property("repeatingSections", REPEATING_SECTIONS)
            .with_property("sortWeight", SORT_WEIGHT);
        service.save_report_design(design)?;

        info!("registered report '{}' with design '{}'", REPORT_NAME, DESIGN_NAME);
        Ok(report)
    }

    /// Purge the render design and report definition by name
    ///
    /// Safe to call when nothing is registered.
    pub fn delete(&self, service: &dyn ReportService) {
        let designs = service.purge_report_design(DESIGN_NAME);
        let definitions = service.purge_report_definition(REPORT_NAME);
        info!(
            "removed {} design(s) and {} definition(s) for '{}'",
            designs, definitions, REPORT_NAME
        );
    }

    fn build_report_definition(
        &self,
        program: &Program,
        visit_type: &VisitType,
    ) -> Result<ReportDefinition, DefinitionError> {
        let mut report = ReportDefinition::new(REPORT_NAME)
            .with_parameter(Parameter::date("reportingStartDate", "Start Date"))
            .with_parameter(Parameter::date("endDate", "End Date"));
        report.set_base_cohort(
            cohorts::enrolled_in_program_with_visit(program, visit_type),
            ParameterMapping::new()
                .map("onOrAfter", "reportingStartDate")
                .map("onOrBefore", "endDate"),
        );
        report.add_dataset(
            build_dataset()?,
            ParameterMapping::new()
                .map("endDate", "endDate")
                .map("reportingStartDate", "reportingStartDate"),
        );
        report.validate()?;
        Ok(report)
    }
}

fn over_reporting_period() -> ParameterMapping {
    ParameterMapping::new()
        .map("startDate", "startDate")
        .map("endDate", "endDate")
}

fn build_dataset() -> Result<IndicatorDataSetDefinition, DefinitionError> {
    let mut dataset = IndicatorDataSetDefinition::new(DATASET_NAME)
        .with_parameter(Parameter::date("endDate", "End Date"))
        .with_parameter(Parameter::date("reportingStartDate", "Start Date"));

    // Totals by age band, regardless of sex.
    dataset.add_column(
        "2All<1",
        "PECG: Currently on ART: Patients below 1 year",
        Mapped::new(indicators::below_1_year(), over_reporting_period()),
    )?;
    dataset.add_column(
        "2All1-4",
        "PECG: Currently on ART: Patients between 1 and 4 years",
        Mapped::new(indicators::between_1_and_4_years(), over_reporting_period()),
    )?;
    dataset.add_column(
        "2All5-9",
        "PECG: Currently on ART: Patients between 5 and 9 years",
        Mapped::new(indicators::between_5_and_9_years(), over_reporting_period()),
    )?;
    dataset.add_column(
        "2All10-14",
        "PECG: Currently on ART: Patients between 10 and 14 years",
        Mapped::new(indicators::between_10_and_14_years(), over_reporting_period()),
    )?;
    dataset.add_column(
        "2All15-19",
        "PECG: Currently on ART: Patients between 15 and 19 years",
        Mapped::new(indicators::between_15_and_19_years(), over_reporting_period()),
    )?;
    dataset.add_column(
        "2All20-24",
        "PECG: Currently on ART: Patients between 20 and 24 years",
        Mapped::new(indicators::between_20_and_24_years(), over_reporting_period()),
    )?;
    dataset.add_column(
        "2All25-49",
        "PECG: Currently on ART: Patients between 25 and 49 years",
        Mapped::new(indicators::between_25_and_49_years(), over_reporting_period()),
    )?;
    dataset.add_column(
        "2All50-Above",
        "PECG: Currently on ART: Patients between 50 years and above",
        Mapped::new(indicators::above_50_years(), over_reporting_period()),
    )?;

    for (i, band) in cohorts::standard_age_bands().into_iter().enumerate() {
        dataset.add_column(
            format!("2M{}", i),
            format!("Males:PECG: Currently on ART by age and sex: {}", band.name),
            Mapped::new(
                indicators::in_age_range_by_sex(band, cohorts::males()),
                over_reporting_period(),
            ),
        )?;
    }

    for (i, band) in cohorts::standard_age_bands().into_iter().enumerate() {
        dataset.add_column(
            format!("2F{}", i),
            format!("Females:PECG: Currently on ART by age and sex: {}", band.name),
            Mapped::new(
                indicators::in_age_range_by_sex(band, cohorts::females()),
                over_reporting_period(),
            ),
        )?;
    }

    dataset.add_column(
        "2All",
        "PECG: Currently on ART",
        Mapped::new(indicators::all_patients(), over_reporting_period()),
    )?;

    Ok(dataset)
}
