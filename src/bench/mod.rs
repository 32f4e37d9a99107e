//! Bench module: drives external converters over the harvested corpus
//!
//! This module contains:
//! - External tool checks, version probes and process execution
//! - The batch converter used by the `convert` subcommand
//! - Host environment detection
//! - The timing tool invocation
//! - [`run_benchmark`], which ties them together and writes the report

mod convert;
mod environment;
mod hyperfine;
mod tools;

pub use convert::{BatchConverter, ConversionSummary};
pub use environment::EnvironmentInfo;
pub use hyperfine::{TimingPlan, HYPERFINE};
pub use tools::{check_tool, check_tools, parse_version, run_program, run_shell, tool_version};

use crate::config::Config;
use crate::harvest::harvest;
use crate::output::{BenchmarkReport, InputStats};
use crate::BenchError;
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Runs the full benchmark and writes the report
///
/// Steps, in order:
/// 1. Check that every required tool is installed
/// 2. Harvest the corpus if it is missing, or always when `refetch` is set
/// 3. Run the preparation commands
/// 4. Time the converter commands
/// 5. Collect versions, input statistics and environment facts
/// 6. Write the Markdown report
///
/// # Arguments
///
/// * `config` - The full configuration
/// * `config_hash` - Hash of the configuration, recorded in the report
/// * `refetch` - Harvest even if the corpus directory already exists
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written report
/// * `Err(BenchError)` - The first step that failed
pub async fn run_benchmark(
    config: &Config,
    config_hash: &str,
    refetch: bool,
) -> Result<PathBuf, BenchError> {
    check_tools(&config.bench.required_tools).await?;

    let pages_dir = Path::new(&config.harvest.output_dir);
    if refetch || !pages_dir.is_dir() {
        tracing::info!("Harvesting pages into {}", pages_dir.display());
        let report = harvest(&config.harvest).await?;
        tracing::info!(
            "Harvested {} pages in {} batches",
            report.persisted.len(),
            report.batches
        );
    } else {
        tracing::info!("Using existing pages in {}", pages_dir.display());
    }

    for (index, command_line) in config.bench.prepare.iter().enumerate() {
        tracing::info!("Preparing: {}", command_line);
        run_shell(&format!("prepare #{}", index + 1), command_line).await?;
    }

    let plan = TimingPlan::from_config(&config.bench);
    let results = plan.run().await?;

    let mut versions = Vec::with_capacity(config.bench.versions.len());
    for entry in &config.bench.versions {
        let version = tool_version(entry).await?;
        tracing::debug!("{} version {}", entry.name, version);
        versions.push((entry.name.clone(), version));
    }

    let report = BenchmarkReport {
        seed_url: config.harvest.seed_url.clone(),
        page_count: config.harvest.page_count,
        converters: config
            .bench
            .commands
            .iter()
            .map(|entry| entry.name.clone())
            .collect(),
        timing_command: plan.display(),
        environment: EnvironmentInfo::detect(),
        versions,
        inputs: InputStats::collect(pages_dir).await?,
        results,
        config_hash: config_hash.to_string(),
        generated_at: Utc::now(),
    };

    let report_path = PathBuf::from(&config.bench.report_path);
    report.write(&report_path).await?;

    Ok(report_path)
}
