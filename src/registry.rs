//! Resort registry loading from the declarative YAML file.
//!
//! `resorts.yaml` holds a `resorts:` list of entries. A malformed or
//! missing file aborts the run (no output would be safely producible),
//! but an individually invalid entry is logged and skipped so one bad
//! record cannot take the whole registry down.

use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::models::ResortConfig;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed registry {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, serde::Deserialize)]
struct RegistryFile {
    #[serde(default)]
    resorts: Vec<serde_yaml::Value>,
}

/// Load resort configurations from the YAML registry.
///
/// # Arguments
///
/// * `path` - Path to `resorts.yaml`
///
/// # Returns
///
/// All valid entries, in file order. Entries that fail to deserialize are
/// skipped with a warning.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_resorts(path: impl AsRef<Path>) -> Result<Vec<ResortConfig>, RegistryError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| RegistryError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: RegistryFile = serde_yaml::from_str(&raw).map_err(|e| RegistryError::Yaml {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut resorts = Vec::new();
    for item in file.resorts {
        let slug = item
            .get("slug")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        match serde_yaml::from_value::<ResortConfig>(item) {
            Ok(resort) => resorts.push(resort),
            Err(e) => warn!(%slug, error = %e, "Invalid resort config; skipping entry"),
        }
    }

    info!(count = resorts.len(), "Loaded resorts from registry");
    Ok(resorts)
}

/// Load only the enabled resorts from the registry.
pub fn enabled_resorts(path: impl AsRef<Path>) -> Result<Vec<ResortConfig>, RegistryError> {
    let resorts = load_resorts(path)?;
    let enabled: Vec<ResortConfig> = resorts.into_iter().filter(|r| r.enabled).collect();
    info!(count = enabled.len(), "Resorts enabled");
    Ok(enabled)
}
