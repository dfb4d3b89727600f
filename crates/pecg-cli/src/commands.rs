//! Command implementations

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use colored::Colorize;
use std::path::Path;

use pecg_engine::{ClinicalStore, EvaluationContext, InMemoryReportService, ReportService, run_report};
use pecg_report::{PecgReportConfig, REPORT_NAME, SetupPecgReport};

use crate::OutputFormat;

fn load_registry(path: &Path) -> Result<InMemoryReportService> {
    if path.exists() {
        InMemoryReportService::load_json_file(path)
            .with_context(|| format!("Failed to load registry: {}", path.display()))
    } else {
        Ok(InMemoryReportService::new())
    }
}

fn save_registry(service: &InMemoryReportService, path: &Path) -> Result<()> {
    service
        .save_json_file(path)
        .with_context(|| format!("Failed to write registry: {}", path.display()))
}

fn load_bundle(path: &Path) -> Result<ClinicalStore> {
    ClinicalStore::from_json_file(path)
        .with_context(|| format!("Failed to load clinical bundle: {}", path.display()))
}

/// Register the PECG report into the registry file
pub fn register(
    registry: &Path,
    bundle: &Path,
    program_id: i32,
    visit_type_uuid: String,
) -> Result<()> {
    let store = load_bundle(bundle)?;
    let service = load_registry(registry)?;

    let setup = SetupPecgReport::with_config(PecgReportConfig {
        program_id,
        visit_type_uuid,
    });
    let report = setup
        .setup(&store, &service)
        .context("Failed to register the PECG report")?;
    save_registry(&service, registry)?;

    let columns = report
        .datasets
        .first()
        .map(|dataset| dataset.inner.columns().len())
        .unwrap_or(0);
    println!(
        "{} '{}' ({} dataset column(s))",
        "Registered".green().bold(),
        report.name,
        columns
    );
    Ok(())
}

/// Remove the PECG report from the registry file
pub fn remove(registry: &Path) -> Result<()> {
    let service = load_registry(registry)?;
    SetupPecgReport::new().delete(&service);
    save_registry(&service, registry)?;

    println!("{} '{}'", "Removed".yellow().bold(), REPORT_NAME);
    Ok(())
}

/// Show the registered definitions and designs
pub fn status(registry: &Path) -> Result<()> {
    let service = load_registry(registry)?;
    let state = service.state();

    if state.report_definitions.is_empty() && state.report_designs.is_empty() {
        println!("Nothing registered in {}", registry.display());
        return Ok(());
    }

    for definition in &state.report_definitions {
        let columns: usize = definition
            .datasets
            .iter()
            .map(|dataset| dataset.inner.columns().len())
            .sum();
        println!(
            "{} {} - {} parameter(s), {} dataset(s), {} column(s)",
            "report".cyan().bold(),
            definition.name,
            definition.parameters.len(),
            definition.datasets.len(),
            columns
        );
    }
    for design in &state.report_designs {
        println!(
            "{} {} - renders '{}' via {:?}",
            "design".cyan().bold(),
            design.name,
            design.report_name,
            design.renderer
        );
        for (key, value) in &design.properties {
            println!("  {} = {}", key, value);
        }
    }
    Ok(())
}

/// Evaluate the registered report against a clinical bundle
pub fn run(
    registry: &Path,
    bundle: &Path,
    start: NaiveDate,
    end: NaiveDate,
    format: OutputFormat,
) -> Result<()> {
    let service = load_registry(registry)?;
    let Some(report) = service.report_definition(REPORT_NAME) else {
        bail!("'{}' is not registered; run `pecg register` first", REPORT_NAME);
    };
    let store = load_bundle(bundle)?;

    let ctx = EvaluationContext::new()
        .with_date("reportingStartDate", start)
        .with_date("endDate", end);
    let result = run_report(&store, &report, &ctx)
        .with_context(|| format!("Failed to evaluate '{}'", REPORT_NAME))?;

    match format {
        OutputFormat::Table => {
            println!(
                "{} ({} to {}), base population: {}",
                result.report_name.bold(),
                start,
                end,
                result.base_cohort_size
            );
            for dataset in &result.datasets {
                println!("\n{}", dataset.name.bold());
                for cell in &dataset.columns {
                    println!("  {:<14} {:>7}  {}", cell.key, cell.count, cell.label);
                }
            }
        }
        OutputFormat::Csv => {
            println!("column,label,count");
            for dataset in &result.datasets {
                for cell in &dataset.columns {
                    println!("{},{},{}", cell.key, cell.label, cell.count);
                }
            }
        }
    }
    Ok(())
}
