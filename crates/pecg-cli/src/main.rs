//! PECG report command-line tool
//!
//! Replaces the host platform's management page with four operations:
//! register the report into a registry file, remove it, show what is
//! registered, and evaluate it against a clinical bundle.

mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

const DEFAULT_REGISTRY: &str = "pecg-registry.json";

/// PECG report management
#[derive(Parser)]
#[command(name = "pecg")]
#[command(author, version, about = "PECG report management", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the PECG report definition and its render design
    Register {
        /// Registry file the definitions are persisted to
        #[arg(short, long, default_value = DEFAULT_REGISTRY)]
        registry: PathBuf,
        /// Clinical bundle the program and visit type are resolved from
        #[arg(short, long)]
        bundle: PathBuf,
        /// Program identifier the report is scoped to
        #[arg(long, default_value_t = pecg_report::DEFAULT_PROGRAM_ID)]
        program_id: i32,
        /// Visit type UUID the base population requires
        #[arg(long, default_value = pecg_report::DEFAULT_VISIT_TYPE_UUID)]
        visit_type_uuid: String,
    },
    /// Remove the PECG report definition and its render design
    Remove {
        /// Registry file the definitions are persisted to
        #[arg(short, long, default_value = DEFAULT_REGISTRY)]
        registry: PathBuf,
    },
    /// Show what is registered
    Status {
        /// Registry file the definitions are persisted to
        #[arg(short, long, default_value = DEFAULT_REGISTRY)]
        registry: PathBuf,
    },
    /// Evaluate the registered report against a clinical bundle
    Run {
        /// Registry file the definitions are persisted to
        #[arg(short, long, default_value = DEFAULT_REGISTRY)]
        registry: PathBuf,
        /// Clinical bundle to evaluate against
        #[arg(short, long)]
        bundle: PathBuf,
        /// Reporting window start (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Reporting window end (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// How `run` prints the evaluated dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for reading
    Table,
    /// One `column,label,count` line per cell
    Csv,
}

fn main() {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Register {
            registry,
            bundle,
            program_id,
            visit_type_uuid,
        } => commands::register(&registry, &bundle, program_id, visit_type_uuid),
        Commands::Remove { registry } => commands::remove(&registry),
        Commands::Status { registry } => commands::status(&registry),
        Commands::Run {
            registry,
            bundle,
            start,
            end,
            format,
        } => commands::run(&registry, &bundle, start, end, format),
    };

    if let Err(err) = result {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
