//! JSON output formatter

use repochunk_core::{FileMetadata, RunReport, StrategyTable};

pub fn format_report(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_files(files: &[FileMetadata]) -> String {
    serde_json::to_string_pretty(files).unwrap_or_else(|_| "[]".to_string()) + "\n"
}

pub fn format_strategies(table: &StrategyTable) -> String {
    let output: Vec<serde_json::Value> = table
        .iter()
        .map(|(key, strategy)| {
            serde_json::json!({
                "key": key,
                "extensions": key.extensions(),
                "strategy": strategy,
            })
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string()) + "\n"
}
