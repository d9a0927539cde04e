//! Status command handler

use anyhow::{Context, Result};

use tomo_core::{Config, NoteFilter, NoteStore};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &NoteStore, output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let total = store.notes().len();
    let visible = store.get_all_notes(&NoteFilter::default()).len();
    let archived = store.get_archived_notes().len();
    let deleted = store.get_recently_deleted_notes().len();
    let folders = store.folders().len();

    let db_size = std::fs::metadata(config.db_path())
        .map(|m| m.len())
        .unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "sync_enabled": config.sync_enabled,
                    "sync_url": config.sync_url,
                    "storage": {
                        "data_dir": config.data_dir,
                        "database_size": db_size
                    },
                    "counts": {
                        "folders": folders,
                        "notes": total,
                        "visible": visible,
                        "archived": archived,
                        "deleted": deleted
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", total);
        }
        OutputFormat::Human => {
            println!("tomo Status");
            println!("===========");
            println!();
            println!("Sync:");
            println!(
                "  Status: {}",
                if config.sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            if let Some(ref url) = config.sync_url {
                println!("  Peer:   {}", url);
            }
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Size:     {} bytes", db_size);
            println!();
            println!("Contents:");
            println!("  Folders:  {}", folders);
            println!("  Notes:    {} ({} visible)", total, visible);
            println!("  Archived: {}", archived);
            println!("  Deleted:  {}", deleted);
        }
    }

    Ok(())
}
