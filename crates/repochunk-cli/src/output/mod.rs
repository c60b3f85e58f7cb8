//! Output formatters

pub mod json;
pub mod terminal;

use crate::app::OutputFormat;
use repochunk_core::{FileMetadata, RunReport, StrategyTable};

/// Format a run report
pub fn format_report(report: &RunReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_report(report),
        OutputFormat::Cli => terminal::format_report(report),
    }
}

/// Format the files of a dump
pub fn format_files(files: &[FileMetadata], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_files(files),
        OutputFormat::Cli => terminal::format_files(files),
    }
}

/// Format the strategy table
pub fn format_strategies(table: &StrategyTable, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format_strategies(table),
        OutputFormat::Cli => terminal::format_strategies(table),
    }
}
