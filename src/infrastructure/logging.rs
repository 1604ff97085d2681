//! Logging system configuration and initialization
//!
//! This module provides the logging setup for a run:
//! - Console output and a plain or JSON log file
//! - Level and per-module filters from the configuration file
//! - `RUST_LOG` override
//! - Timestamps in a fixed UTC offset (Brasília time by default)
//! - The previous run's log file is kept under a timestamped name

#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub use crate::infrastructure::config::LoggingConfig;

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<WorkerGuard>> = Mutex::new(Vec::new());
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Timestamp formatter for a fixed UTC offset
#[derive(Debug, Clone, Copy)]
struct OffsetTimeFormatter {
    offset: FixedOffset,
}

impl OffsetTimeFormatter {
    /// Out-of-range offsets fall back to UTC
    fn new(utc_offset_hours: i32) -> Self {
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    fn now(&self) -> chrono::DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

impl FormatTime for OffsetTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", self.now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Name under which a previous run's log file is kept
fn rotated_file_name(log_file_name: &str, stamp: &chrono::DateTime<FixedOffset>) -> String {
    let file_stem = log_file_name.trim_end_matches(".log");
    format!("{}.{}.log", file_stem, stamp.format("%Y%m%dT%H%M%S"))
}

/// Rename the previous run's log file with its modification time
fn rotate_existing_log_file(log_dir: &Path, log_file_name: &str, offset: FixedOffset) -> Result<()> {
    let log_file_path = log_dir.join(log_file_name);
    if !log_file_path.exists() {
        return Ok(());
    }

    let metadata = std::fs::metadata(&log_file_path)
        .map_err(|e| anyhow!("Failed to get log file metadata: {}", e))?;
    let file_time = metadata
        .modified()
        .unwrap_or_else(|_| std::time::SystemTime::now());
    let datetime: chrono::DateTime<Utc> = file_time.into();

    let rotated_path = log_dir.join(rotated_file_name(log_file_name, &datetime.with_timezone(&offset)));
    std::fs::rename(&log_file_path, &rotated_path).map_err(|e| {
        anyhow!(
            "Failed to rotate log file {} to {}: {}",
            log_file_path.display(),
            rotated_path.display(),
            e
        )
    })
}

/// Filter directives: base level, then configured module overrides
///
/// Module overrides are skipped at TRACE so every dependency shows up.
fn filter_directives(config: &LoggingConfig) -> Vec<String> {
    let mut directives = vec![config.level.clone()];
    if config.level.to_lowercase().contains("trace") {
        return directives;
    }

    let mut modules: Vec<(&String, &String)> = config.module_filters.iter().collect();
    modules.sort();
    directives.extend(modules.into_iter().map(|(module, level)| format!("{}={}", module, level)));
    directives
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let mut directives = filter_directives(config).into_iter();
    let base = directives.next().unwrap_or_else(|| "info".to_string());
    let mut filter = EnvFilter::new(base);
    for directive in directives {
        match directive.parse() {
            Ok(parsed) => filter = filter.add_directive(parsed),
            Err(e) => eprintln!("Ignoring invalid log filter '{}': {}", directive, e),
        }
    }
    filter
}

/// Initialize logging with custom configuration
///
/// # Environment Variable Override
/// `RUST_LOG` replaces the configured level and module filters entirely:
/// ```bash
/// RUST_LOG="debug,reqwest=debug,chromiumoxide=info" catalog-harvester -i urls.csv
/// ```
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let timer = OffsetTimeFormatter::new(config.utc_offset_hours);
    let log_dir = config.log_dir.clone().unwrap_or_else(get_log_directory);
    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;
        rotate_existing_log_file(&log_dir, &config.file_name, timer.offset)?;

        let (file_writer, file_guard) = non_blocking(rolling::never(&log_dir, &config.file_name));
        match LOG_GUARDS.lock() {
            Ok(mut guards) => guards.push(file_guard),
            Err(poisoned) => poisoned.into_inner().push(file_guard),
        }

        let file_layer = fmt::Layer::new()
            .with_writer(file_writer)
            .with_timer(timer)
            .with_ansi(false);
        if config.json_format {
            layers.push(
                file_layer
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .boxed(),
            );
        } else {
            layers.push(file_layer.with_target(false).boxed());
        }
    }

    if config.console_output {
        layers.push(
            fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_timer(timer)
                .with_target(false)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(build_env_filter(config))
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    info!("Logging system initialized");
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
    }
    info!("Log level: {}", config.level);
    if config.level.to_lowercase().contains("trace") {
        warn!("TRACE level active - dependency logs are not filtered");
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Catalog Harvester ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);

    if let Ok(current_dir) = std::env::current_dir() {
        info!("Working directory: {:?}", current_dir);
    }
    info!("=========================");
}
