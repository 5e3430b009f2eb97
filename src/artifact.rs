//! Artifact persistence helpers
//!
//! Fitted objects (preprocessor, model) are persisted as pretty-printed
//! JSON; anything `Serialize`/`DeserializeOwned` round-trips.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Serialize `value` as pretty JSON at `path`, creating parent directories
/// as needed.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "saved artifact");
    Ok(())
}

/// Load a value previously written with [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&json)?;
    info!(path = %path.display(), "loaded artifact");
    Ok(value)
}
