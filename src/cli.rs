//! Command-line interface definitions for Tahoe Conditions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The contact email can also be provided via the `NWS_CONTACT_EMAIL`
//! environment variable.

use clap::{Parser, Subcommand};

use crate::settings;

/// Command-line arguments for the Tahoe Conditions aggregator.
///
/// # Examples
///
/// ```sh
/// # Run a full update with defaults
/// tahoe_conditions update
///
/// # Verbose run against an alternate registry and output directory
/// tahoe_conditions -v update --registry ./resorts.yaml --output-dir ./public/data
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch and update all resort conditions
    Update {
        /// Path to the resort registry YAML file
        #[arg(long, default_value = settings::DEFAULT_REGISTRY)]
        registry: String,

        /// Base directory for generated JSON artifacts
        #[arg(long, default_value = settings::DEFAULT_OUTPUT_DIR)]
        output_dir: String,

        /// Directory for cached HTTP responses
        #[arg(long, default_value = settings::DEFAULT_CACHE_DIR)]
        cache_dir: String,

        /// Contact email reported to the NWS API in the User-Agent header
        #[arg(long, env = "NWS_CONTACT_EMAIL")]
        contact_email: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(&["tahoe_conditions", "update"]);

        assert!(!cli.verbose);
        match cli.command {
            Some(Command::Update {
                registry,
                output_dir,
                cache_dir,
                ..
            }) => {
                assert_eq!(registry, "resorts.yaml");
                assert_eq!(output_dir, "public/data");
                assert_eq!(cache_dir, ".cache");
            }
            other => panic!("expected update command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from(&[
            "tahoe_conditions",
            "-v",
            "update",
            "--registry",
            "/tmp/resorts.yaml",
            "--output-dir",
            "/tmp/data",
            "--contact-email",
            "ops@example.org",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Some(Command::Update {
                registry,
                output_dir,
                contact_email,
                ..
            }) => {
                assert_eq!(registry, "/tmp/resorts.yaml");
                assert_eq!(output_dir, "/tmp/data");
                assert_eq!(contact_email.as_deref(), Some("ops@example.org"));
            }
            other => panic!("expected update command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_no_command() {
        let cli = Cli::parse_from(&["tahoe_conditions"]);
        assert!(cli.command.is_none());
    }
}
