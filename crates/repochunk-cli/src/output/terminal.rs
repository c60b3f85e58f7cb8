//! Terminal output formatter

use repochunk_core::{ChunkStrategy, FileMetadata, RunReport, StrategyTable, StructuralMetadata};

pub fn format_report(report: &RunReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("Started:         {}\n", report.started_at.to_rfc3339()));
    output.push_str(&format!("Duration:        {} ms\n", report.duration_ms));
    output.push_str(&format!("Files:           {}\n", report.files_total));
    output.push_str(&format!("  Chunked:       {}\n", report.files_chunked));
    output.push_str(&format!("  Skipped:       {}\n", report.files_skipped.len()));
    output.push_str(&format!("  Not scheduled: {}\n", report.files_not_scheduled));
    output.push_str(&format!("Chunks:          {}\n", report.chunks_emitted));
    output.push_str(&format!("Metadata issues: {}\n", report.metadata_issues));
    if report.cancelled {
        output.push_str("Run was cancelled before all files were scheduled\n");
    }

    for skipped in &report.files_skipped {
        output.push_str(&format!("  skipped {}: {}\n", skipped.path, skipped.reason));
    }

    output
}

pub fn format_files(files: &[FileMetadata]) -> String {
    if files.is_empty() {
        return String::new();
    }

    let mut output = String::new();
    for file in files {
        let kind = match &file.structural {
            StructuralMetadata::Code(code) => format!(
                "code: {} functions, {} classes",
                code.functions().count(),
                code.classes().count()
            ),
            other => other.key().unwrap_or("-").to_string(),
        };
        output.push_str(&format!(
            "{:<50} {:<10} {:>8} B {:>6} lines  {}\n",
            file.path,
            if file.extension.is_empty() {
                "-"
            } else {
                file.extension.as_str()
            },
            file.size_bytes,
            file.line_count,
            kind
        ));
    }
    output
}

pub fn format_strategies(table: &StrategyTable) -> String {
    let mut output = String::new();

    for (key, strategy) in table.iter() {
        let extensions = if key.extensions().is_empty() {
            "(anything else)".to_string()
        } else {
            key.extensions().join(" ")
        };
        output.push_str(&format!("{:<10} {}\n", key.as_str(), extensions));

        match strategy {
            ChunkStrategy::Recursive(config) => {
                output.push_str(&format!(
                    "  size {}, overlap {}, separators {:?}{}\n",
                    config.chunk_size,
                    config.chunk_overlap,
                    config.separators,
                    if config.separator_regex { " (regex)" } else { "" }
                ));
            }
            ChunkStrategy::MarkdownHeaders { max_level, resplit } => {
                output.push_str(&format!(
                    "  headers 1-{}, sections over {} re-split with overlap {}, separators {:?}\n",
                    max_level, resplit.chunk_size, resplit.chunk_overlap, resplit.separators
                ));
            }
        }
    }

    output
}
