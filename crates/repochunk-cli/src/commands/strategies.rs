//! Strategies command

use crate::app::OutputFormat;
use crate::output::format_strategies;
use anyhow::Result;
use repochunk_core::Config;

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    print!("{}", format_strategies(&config.strategy_table(), format));
    Ok(())
}
