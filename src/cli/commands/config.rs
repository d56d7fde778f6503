//! Config Command
//!
//! Inspect repodoc configuration.
//!
//! Usage:
//!   repodoc config show [-f json]
//!   repodoc config path

use std::path::Path;

use crate::config::ConfigLoader;
use crate::types::{DocError, Result};

/// Print the effective configuration (credentials omitted)
pub fn show(format: &str, config_file: Option<&Path>) -> Result<()> {
    let as_json = match format {
        "json" => true,
        "toml" => false,
        other => {
            return Err(DocError::Config(format!(
                "Unknown format '{}'. Valid values: toml, json",
                other
            )));
        }
    };

    let config = ConfigLoader::load_with(config_file)?;
    println!("{}", ConfigLoader::render(&config, as_json)?);
    Ok(())
}

/// Print configuration file locations
pub fn path() -> Result<()> {
    println!("Configuration files (later entries override earlier ones):");
    match ConfigLoader::global_config_path() {
        Some(global) => println!("  Global:  {}{}", global.display(), marker(global.exists())),
        None => println!("  Global:  (cannot determine config directory)"),
    }
    let project = ConfigLoader::project_config_path();
    println!("  Project: {}{}", project.display(), marker(project.exists()));
    println!("Environment: flat keys (GITHUB_TOKEN, LLM_TYPE, ...) and REPODOC_<SECTION>__<KEY>");
    Ok(())
}

fn marker(exists: bool) -> &'static str {
    if exists { "" } else { " (not found)" }
}
