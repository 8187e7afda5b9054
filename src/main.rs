//! # Tahoe Conditions
//!
//! An aggregation pipeline that fetches operational and snow data from
//! Lake Tahoe ski resort websites, attaches National Weather Service
//! forecasts, normalizes everything into one schema, and writes static
//! JSON artifacts for downstream consumption.
//!
//! ## Features
//!
//! - Per-resort parsing strategies selected from a declarative
//!   `resorts.yaml` registry
//! - Last-known-good fallback: when a source breaks, the previous record
//!   is re-emitted with a `stale` marker instead of disappearing
//! - Two-step NWS weather lookup (points, then gridded forecast) with its
//!   own cache
//! - TTL-cached, rate-limited, retrying HTTP fetches
//!
//! ## Usage
//!
//! ```sh
//! tahoe_conditions update
//! ```
//!
//! ## Architecture
//!
//! Each run is a single sequential pass:
//! 1. **Registry**: load enabled resorts from `resorts.yaml`
//! 2. **Fetch/Parse**: run each resort's adapter, falling back to the
//!    previous output on failure
//! 3. **Weather**: attach NWS data per resort, independently of ops/snow
//! 4. **Output**: write per-resort JSON, `latest.json`, and
//!    `summary.json`

use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod adapters;
mod cli;
mod http;
mod models;
mod outputs;
mod pipeline;
mod registry;
mod settings;
mod summarize;
mod utils;
mod weather;

use cli::{Cli, Command};
use http::Fetcher;
use models::ResortConditions;
use outputs::json::{write_all_outputs, OutputPaths};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let default_filter = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    debug!(?args, "Parsed CLI arguments");

    match args.command {
        Some(Command::Update {
            registry,
            output_dir,
            cache_dir,
            contact_email,
        }) => update(registry, output_dir, cache_dir, contact_email).await,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            std::process::exit(1);
        }
    }
}

/// Run the full update pipeline.
async fn update(
    registry_path: String,
    output_dir: String,
    cache_dir: String,
    contact_email: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("conditions_update starting up");

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&output_dir).await {
        error!(
            path = %output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // Load enabled resorts; a broken registry is fatal
    let resorts = registry::enabled_resorts(&registry_path)?;
    if resorts.is_empty() {
        error!(path = %registry_path, "No enabled resorts found in registry");
        return Err("no enabled resorts in registry".into());
    }

    let contact = contact_email.unwrap_or_else(|| settings::DEFAULT_CONTACT_EMAIL.to_string());
    let fetcher = Fetcher::new(&cache_dir, &settings::user_agent(&contact));
    let paths = OutputPaths::new(&output_dir);

    // Process resorts one at a time; volume is single-digit and the
    // sources are rate limited anyway
    let results: Vec<ResortConditions> = stream::iter(&resorts)
        .then(|config| pipeline::process_resort(&fetcher, &paths, config))
        .collect()
        .await;

    let summary = summarize::generate_summary(&results);
    write_all_outputs(&paths, &results, &summary).await?;

    info!(
        open = summary.counts.open_resorts,
        closed = summary.counts.closed_resorts,
        stale = summary.counts.stale_resorts,
        "Update complete"
    );

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
