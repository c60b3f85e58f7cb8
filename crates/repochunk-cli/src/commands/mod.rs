//! CLI command handlers

pub mod chunk;
pub mod files;
pub mod strategies;
