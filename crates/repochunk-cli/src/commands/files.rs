//! Files command

use crate::app::{FilesArgs, OutputFormat};
use crate::output::format_files;
use anyhow::Result;
use repochunk_core::{extract_file_metadata, parse_dump, read_dump, FileMetadata};

pub async fn run(args: FilesArgs, format: OutputFormat) -> Result<()> {
    let dump = read_dump(&args.dump)?;
    let files: Vec<FileMetadata> = parse_dump(&dump)
        .iter()
        .map(|record| extract_file_metadata(&record.path, &record.content))
        .collect();

    print!("{}", format_files(&files, format));
    Ok(())
}
