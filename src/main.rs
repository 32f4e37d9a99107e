//! pagebench main entry point
//!
//! This is the command-line interface for the HTML-to-Markdown benchmark
//! harness.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pagebench::bench::{run_benchmark, BatchConverter};
use pagebench::config::{hash_content, load_config_with_hash, validate, Config};
use pagebench::harvest::harvest;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// pagebench: an HTML-to-Markdown converter benchmark harness
///
/// pagebench harvests a bounded set of pages linked from a seed page, then
/// times external converters over them and writes a Markdown report.
#[derive(Parser, Debug)]
#[command(name = "pagebench")]
#[command(version)]
#[command(about = "An HTML-to-Markdown converter benchmark harness", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the pages linked from the seed page and save them as HTML
    Harvest {
        /// Seed page URL
        #[arg(long)]
        seed: Option<String>,

        /// Number of pages to fetch
        #[arg(long)]
        count: Option<usize>,

        /// Output directory (cleared first)
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Convert every .html file in a directory with the configured program
    Convert {
        /// Directory containing the .html files
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Output directory for the converted files
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Maximum number of conversion processes at once
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Run the full benchmark and write the report
    Bench {
        /// Harvest the pages again even if they already exist
        #[arg(long)]
        refetch: bool,
    },

    /// Validate the configuration and print the effective settings
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = load(cli.config.as_ref())?;

    match cli.command {
        Command::Harvest { seed, count, out } => {
            if let Some(seed) = seed {
                config.harvest.seed_url = seed;
            }
            if let Some(count) = count {
                config.harvest.page_count = count;
            }
            if let Some(out) = out {
                config.harvest.output_dir = out.to_string_lossy().into_owned();
            }
            validate(&config)?;
            handle_harvest(&config).await
        }
        Command::Convert {
            input_dir,
            out,
            concurrency,
        } => {
            if let Some(out) = out {
                config.convert.output_dir = out.to_string_lossy().into_owned();
            }
            if let Some(concurrency) = concurrency {
                config.convert.concurrency = concurrency;
            }
            validate(&config)?;
            handle_convert(&config, input_dir).await
        }
        Command::Bench { refetch } => handle_bench(&config, &config_hash, refetch).await,
        Command::Config => {
            handle_show_config(&config, &config_hash);
            Ok(())
        }
    }
}

/// Loads the configuration file, or the defaults when no file is given
fn load(path: Option<&PathBuf>) -> anyhow::Result<(Config, String)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((config, hash))
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            let config = Config::default();
            validate(&config)?;
            Ok((config, hash_content("")))
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagebench=info,warn"),
            1 => EnvFilter::new("pagebench=debug,info"),
            2 => EnvFilter::new("pagebench=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

async fn handle_harvest(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting up to {} pages from {}",
        config.harvest.page_count,
        config.harvest.seed_url
    );

    let report = harvest(&config.harvest).await?;

    println!(
        "✓ Saved {} of {} discovered pages to {}",
        report.persisted.len(),
        report.discovered,
        config.harvest.output_dir
    );
    Ok(())
}

async fn handle_convert(config: &Config, input_dir: PathBuf) -> anyhow::Result<()> {
    let converter = BatchConverter::new(&config.convert);
    let summary = converter.convert_dir(&input_dir).await?;

    println!(
        "✓ Converted {} files into {} in {}ms",
        summary.outputs.len(),
        converter.output_dir().display(),
        summary.elapsed.as_millis()
    );
    Ok(())
}

async fn handle_bench(config: &Config, config_hash: &str, refetch: bool) -> anyhow::Result<()> {
    let report_path = run_benchmark(config, config_hash, refetch).await?;
    println!("✓ Report written to {}", report_path.display());
    Ok(())
}

/// Prints the effective configuration
fn handle_show_config(config: &Config, config_hash: &str) {
    println!("=== pagebench configuration ===\n");

    println!("Harvest:");
    println!("  Seed URL: {}", config.harvest.seed_url);
    println!("  Page count: {}", config.harvest.page_count);
    println!("  Batch size: {}", config.harvest.batch_size);
    println!("  Timeout: {}ms", config.harvest.timeout_ms);
    println!("  Output: {}", config.harvest.output_dir);
    println!("  Renderer: {:?}", config.harvest.renderer);
    println!("  Context policy: {:?}", config.harvest.context_policy);
    println!("  Wait until: {:?}", config.harvest.wait_until);

    println!("\nConvert:");
    println!(
        "  Program: {} ({} -> {})",
        config.convert.program, config.convert.from, config.convert.to
    );
    println!("  Output: {}", config.convert.output_dir);
    println!("  Concurrency: {}", config.convert.concurrency);

    println!("\nBench:");
    println!(
        "  Warmup: {}, runs: {}",
        config.bench.warmup, config.bench.runs
    );
    println!("  Report: {}", config.bench.report_path);
    println!("  Required tools: {}", config.bench.required_tools.join(", "));

    println!("\nCommands ({}):", config.bench.commands.len());
    for entry in &config.bench.commands {
        println!("  - {}: {}", entry.name, entry.command);
    }

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}
