//! Atomic JSON artifact writer and last-known-good loader.
//!
//! Every artifact is written through a temp file in the target directory
//! followed by a rename, so a crashed run never leaves a half-written
//! file where the next run (or a downstream consumer) would read it.

use chrono::Utc;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::models::{LatestFeed, ResortConditions, Summary};

/// Locations of the generated artifacts under the data directory.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    data_dir: PathBuf,
}

impl OutputPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn resorts_dir(&self) -> PathBuf {
        self.data_dir.join("resorts")
    }

    pub fn resort_file(&self, slug: &str) -> PathBuf {
        self.resorts_dir().join(format!("{slug}.json"))
    }

    pub fn latest_file(&self) -> PathBuf {
        self.data_dir.join("latest.json")
    }

    pub fn summary_file(&self) -> PathBuf {
        self.data_dir.join("summary.json")
    }
}

/// Write a value as pretty-printed JSON via temp file + rename.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("artifact");
    let temp_path = path.with_file_name(format!(".{stem}.tmp"));

    fs::write(&temp_path, json).await?;
    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }

    debug!("Wrote artifact");
    Ok(())
}

/// Load a resort's previous output file for last-known-good fallback.
///
/// A missing, unreadable, or unparseable file yields `None`; the caller
/// then falls back to a skeleton record.
pub async fn load_existing_resort(paths: &OutputPaths, slug: &str) -> Option<ResortConditions> {
    let path = paths.resort_file(slug);
    let raw = match fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(_) => return None,
    };

    match serde_json::from_str(&raw) {
        Ok(resort) => Some(resort),
        Err(e) => {
            warn!(%slug, error = %e, "Failed to load existing resort data");
            None
        }
    }
}

/// Write one resort's record.
pub async fn write_resort(paths: &OutputPaths, resort: &ResortConditions) -> Result<(), Box<dyn Error>> {
    write_json_atomic(&paths.resort_file(&resort.slug), resort).await
}

/// Write `latest.json` with every record from this run.
#[instrument(level = "info", skip_all, fields(count = resorts.len()))]
pub async fn write_latest(
    paths: &OutputPaths,
    resorts: &[ResortConditions],
) -> Result<(), Box<dyn Error>> {
    let feed = LatestFeed {
        generated_at_utc: Utc::now(),
        resorts: resorts.to_vec(),
    };
    write_json_atomic(&paths.latest_file(), &feed).await?;
    info!(path = %paths.latest_file().display(), "Wrote latest feed");
    Ok(())
}

/// Write `summary.json`.
pub async fn write_summary(paths: &OutputPaths, summary: &Summary) -> Result<(), Box<dyn Error>> {
    write_json_atomic(&paths.summary_file(), summary).await?;
    info!(path = %paths.summary_file().display(), "Wrote summary");
    Ok(())
}

/// Write all artifacts for a run: per-resort files, the aggregate feed,
/// and the summary.
pub async fn write_all_outputs(
    paths: &OutputPaths,
    resorts: &[ResortConditions],
    summary: &Summary,
) -> Result<(), Box<dyn Error>> {
    for resort in resorts {
        write_resort(paths, resort).await?;
    }
    write_latest(paths, resorts).await?;
    write_summary(paths, summary).await?;
    Ok(())
}
