//! Config command handlers

use anyhow::{bail, Context, Result};

use tomo_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "sync_url": config.sync_url,
                    "sync_enabled": config.sync_enabled
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:     {}", config.data_dir.display());
            println!(
                "  sync_url:     {}",
                config.sync_url.as_deref().unwrap_or("(not set)")
            );
            println!("  sync_enabled: {}", config.sync_enabled);
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match key.as_str() {
        "data_dir" => config.data_dir = value.clone().into(),
        "sync_url" => {
            config.sync_url = if value.is_empty() {
                None
            } else {
                Some(value.clone())
            }
        }
        "sync_enabled" => {
            config.sync_enabled = value.eq_ignore_ascii_case("true") || value == "1";
        }
        _ => bail!(
            "Unknown configuration key: {}. Valid keys: data_dir, sync_url, sync_enabled",
            key
        ),
    }

    config.save().context("Failed to save configuration")?;
    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}
