//! Config subcommands

use anyhow::{Result, bail};
use colored::*;
use scriba_core::{ConfigLoader, EngineConfig};
use std::path::PathBuf;
use tracing::debug;

use crate::ConfigFormat;

/// Config init command implementation
pub fn init_command(format: ConfigFormat, force: bool) -> Result<()> {
    debug!("Initializing configuration file with format: {:?}", format);

    let (filename, content) = match format {
        ConfigFormat::Json => (".scribarc.json", EngineConfig::default().to_json_pretty()?),
        ConfigFormat::Toml => (".scribarc.toml", EngineConfig::default().to_toml()?),
    };

    let config_path = PathBuf::from(filename);
    if config_path.exists() && !force {
        bail!("Configuration file '{filename}' already exists. Use --force to overwrite.");
    }

    std::fs::write(&config_path, content)?;
    println!("{} Created configuration file: {filename}", "✓".green());
    println!("   Add contrastPairs to extend conflict detection.");

    Ok(())
}

/// Config show command implementation
pub fn show_command(config_path: Option<PathBuf>) -> Result<()> {
    let config = ConfigLoader::load(config_path.as_deref(), None)?;
    println!("{}", config.to_json_pretty()?);
    Ok(())
}

/// Config validate command implementation
pub fn validate_command(path: Option<PathBuf>) -> Result<()> {
    debug!("Validating configuration file: {:?}", path);

    let path = match path {
        Some(path) => path,
        None => match ConfigLoader::auto_discover(&PathBuf::from("."))? {
            Some(found) => found,
            None => bail!("No configuration file found"),
        },
    };

    let config = ConfigLoader::load_from_file(&path)?;
    println!("{} Configuration is valid: {}", "✓".green(), path.display());
    println!(
        "   Tiers: core ≥ {}, optional ≥ {}",
        config.tiers.core, config.tiers.optional
    );
    println!("   Extra contrast pairs: {}", config.contrast_pairs.len());
    Ok(())
}

/// Config schema command implementation
pub fn schema_command() -> Result<()> {
    println!("{}", EngineConfig::json_schema()?);
    Ok(())
}
