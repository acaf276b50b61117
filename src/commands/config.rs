//! Configuration file commands.

use std::path::Path;
use std::process::Command;

use crate::config::{config_path, SpecbarsConfig};

/// Opens the specbars configuration file in the user's preferred editor.
///
/// Writes the default configuration first if the file does not exist.
/// Tries editors in this order:
/// 1. $EDITOR environment variable
/// 2. nano (most user-friendly fallback)
/// 3. vi (ultimate fallback, always available)
///
/// # Errors
/// - If the default configuration cannot be written
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = config_path()?;
    ensure_config_exists(&config_path)?;

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    // Surface mistakes now rather than on the next run.
    let config = SpecbarsConfig::load_from(&config_path)?;
    config.settings(config.audio.sample_rate)?;

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Prints the default configuration as TOML.
///
/// # Errors
/// - If serialization fails
pub fn handle_init_config() -> anyhow::Result<()> {
    print!("{}", SpecbarsConfig::default().to_toml()?);
    Ok(())
}

fn ensure_config_exists(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        return Ok(());
    }
    tracing::info!("Writing default configuration to {}", path.display());
    SpecbarsConfig::default().save_to(path)
}

/// Finds the best available editor to use.
///
/// Tries in order: $EDITOR, nano, vi
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    for editor in &["nano", "vi"] {
        if is_editor_available(editor) {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}

/// Checks if an editor is available in the system PATH.
fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
