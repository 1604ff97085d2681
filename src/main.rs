//! Catalog Harvester command line entry point

#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use catalog_harvester_lib::application::{ScrapeContext, read_input_urls, write_output_csv};
use catalog_harvester_lib::infrastructure::config::{AppConfig, ConfigManager};
use catalog_harvester_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use catalog_harvester_lib::infrastructure::renderer::RenderingDispatcher;

#[derive(Debug, Parser)]
#[command(
    name = "catalog-harvester",
    version,
    about = "Scrape product detail pages into a catalog import sheet"
)]
struct Cli {
    /// CSV file with a header row and a `url` column
    #[arg(short, long, value_name = "CSV", required_unless_present = "write_default_config")]
    input: Option<PathBuf>,

    /// Output CSV (defaults to the configured path)
    #[arg(short, long, value_name = "CSV")]
    output: Option<PathBuf>,

    /// Directory for downloaded images
    #[arg(long, value_name = "DIR")]
    images_dir: Option<PathBuf>,

    /// Configuration file (defaults to the per-user config directory)
    #[arg(short, long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Minimum spacing between product page fetches
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Never launch a headless browser; rendered storefronts are fetched plainly
    #[arg(long, default_value_t = false)]
    no_browser: bool,

    /// Log level override (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Write the built-in configuration to the config path and exit
    #[arg(long, default_value_t = false)]
    write_default_config: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(output) = &self.output {
            config.run.output_csv = output.clone();
        }
        if let Some(images_dir) = &self.images_dir {
            config.run.images_dir = images_dir.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.run.courtesy_delay_ms = delay_ms;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

fn config_manager(cli: &Cli) -> Result<ConfigManager> {
    match &cli.config {
        Some(path) => Ok(ConfigManager::with_path(path)),
        None => ConfigManager::new(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let manager = config_manager(&cli)?;

    if cli.write_default_config {
        manager
            .save_config(&AppConfig::default())
            .await
            .context("Failed to write default configuration")?;
        println!("Default configuration written to {}", manager.config_path().display());
        return Ok(());
    }

    let mut config = manager
        .load_config()
        .await
        .with_context(|| format!("Failed to load configuration {:?}", manager.config_path()))?;
    cli.apply_overrides(&mut config);

    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();
    info!("Configuration: {:?}", manager.config_path());

    let input = cli.input.context("--input is required")?;
    let urls = read_input_urls(&input, &config.run.input_column)
        .with_context(|| format!("Failed to read input table {:?}", input))?;
    if urls.is_empty() {
        warn!("⚠️ Input table {:?} has no rows", input);
    }

    let output_csv = config.run.output_csv.clone();
    let dispatcher = RenderingDispatcher::from_settings(!cli.no_browser);
    let context = ScrapeContext::new(config, dispatcher).context("Failed to build scrape context")?;

    let summary = context.run(&urls).await?;
    write_output_csv(&output_csv, &summary.rows)
        .with_context(|| format!("Failed to write output {:?}", output_csv))?;

    info!(
        "Done: {} product(s) ok, {} failed, {} row(s) in {:?}",
        summary.succeeded,
        summary.failed,
        summary.rows.len(),
        output_csv
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
