//! Utility functions for the filechat front end
//!
//! Settings persistence and user-facing error text.

use anyhow::{Context, Result};
use shared::errors::CompletionError;
use shared::settings::AppSettings;
use std::path::PathBuf;

/// Get the config file path
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("filechat");
        p.push("settings.json");
        p
    })
}

/// Load settings from disk or return defaults.
///
/// The flag reports whether a settings file was actually read.
pub fn load_settings_or_default() -> (AppSettings, bool) {
    if let Some(path) = config_path() {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            match serde_json::from_str::<AppSettings>(&contents) {
                Ok(settings) => return (settings, true),
                Err(e) => tracing::warn!("ignoring invalid settings at {}: {}", path.display(), e),
            }
        }
    }
    (AppSettings::default(), false)
}

/// Environment overrides on top of file settings
pub fn apply_env_overrides(settings: &mut AppSettings) {
    apply_overrides(
        settings,
        std::env::var("OPENAI_BASE_URL").ok(),
        std::env::var("FILECHAT_MODEL").ok(),
    );
}

fn apply_overrides(settings: &mut AppSettings, base_url: Option<String>, model: Option<String>) {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        settings.completion.base_url = Some(url.trim().to_string());
    }
    if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
        settings.completion.model = model.trim().to_string();
    }
}

/// Save settings to disk
pub fn save_settings(settings: &AppSettings) -> Result<()> {
    let path = config_path().context("no config directory on this system")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Format an error message with a hint of what to do next
pub fn format_error_message(error: &CompletionError) -> String {
    match error {
        CompletionError::InvalidCredential | CompletionError::QuotaExceeded => {
            format!("{}\nUse /key to enter a different API key.", error)
        }
        CompletionError::MissingCredential => {
            format!("{}\nUse /key to add one.", error)
        }
        CompletionError::Unknown { .. } => format!(
            "{}\n\nIf this keeps happening, check your internet connection and try again.",
            error
        ),
        CompletionError::RateLimited | CompletionError::ContextTooLarge => error.to_string(),
    }
}
