//! pagebench: an HTML-to-Markdown converter benchmark harness
//!
//! This crate harvests a bounded set of web pages into a local corpus and then
//! drives external converters over that corpus under a timing tool, producing a
//! Markdown report.

pub mod bench;
pub mod config;
pub mod harvest;
pub mod output;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pagebench operations
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to discover links from seed page {url}: {source}")]
    Discovery { url: String, source: FetchError },

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to persist {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Per-resource failures raised by a rendering client
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timed out after {timeout_ms}ms waiting for {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Failed to launch rendering context: {0}")]
    Launch(String),
}

/// Failures of external command-line tools
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{tool} is not installed")]
    Missing { tool: String },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },
}

/// Result type alias for pagebench operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{extract_links, HarvestPipeline, HarvestReport, PageFetcher, TaskPool};
pub use output::{sanitize, FilesystemSink};
