//! Command-line interface definition for Termwarden
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for running the gateway server and checking
//! configuration.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Termwarden - Web terminal command gateway
///
/// Serve a JSON API that executes shell commands behind session
/// control, rate limiting, and a command-policy firewall, with
/// AI-assisted diagnosis of failed commands.
#[derive(Parser, Debug, Clone)]
#[command(name = "termwarden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Termwarden
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the gateway HTTP server
    Serve {
        /// Override the listen address from config
        #[arg(long)]
        host: Option<String>,

        /// Override the listen port from config
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the default session working directory
        #[arg(short, long)]
        workdir: Option<PathBuf>,
    },

    /// Load and validate the configuration, then print a summary
    Check,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: "config/config.yaml".to_string(),
            verbose: false,
            command: Commands::Serve {
                host: None,
                port: None,
                workdir: None,
            },
        }
    }
}
