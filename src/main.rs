//! Termwarden - command-execution gateway server
//!
//! Main entry point: parses the CLI, loads configuration, initializes
//! tracing and metrics, then serves or checks.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use termwarden::cli::{Cli, Commands};
use termwarden::config::Config;
use termwarden::metrics::init_metrics_exporter;
use termwarden::suggest::mask_api_key;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load and validate configuration
    let config = Config::load(&cli.config, &cli)?;
    config.validate()?;

    // Initialize tracing and the optional metrics exporter
    init_tracing(cli.verbose, config.server.json_logs);
    init_metrics_exporter();

    // Execute command
    match cli.command {
        Commands::Serve { .. } => {
            tracing::info!(
                host = %config.server.host,
                port = config.server.port,
                "Starting termwarden gateway server"
            );
            termwarden::server::start_server(config).await?;
            Ok(())
        }
        Commands::Check => {
            print_config_summary(&config);
            Ok(())
        }
    }
}

/// Print a human-readable configuration summary for `check`
fn print_config_summary(config: &Config) {
    println!("Configuration OK");
    println!("  listen:            {}:{}", config.server.host, config.server.port);
    match &config.server.workdir {
        Some(dir) => println!("  workdir:           {}", dir.display()),
        None => println!("  workdir:           (process current directory)"),
    }
    println!("  session lifetime:  {}s", config.session.max_lifetime_seconds);
    println!("  sweep interval:    {}s", config.session.sweep_interval_seconds);
    println!("  rate limit:        {}/min", config.session.max_commands_per_minute);
    println!("  command timeout:   {}s", config.executor.timeout_seconds);
    println!("  oracle model:      {}", config.oracle.model);
    match &config.oracle.api_key {
        Some(key) => println!("  oracle api key:    {}", mask_api_key(key)),
        None => println!("  oracle api key:    (not set)"),
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool, json_logs: bool) {
    let default_filter = if verbose {
        "termwarden=debug"
    } else {
        "termwarden=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
