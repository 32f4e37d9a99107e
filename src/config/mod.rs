//! Configuration module for pagebench
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the harness also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use pagebench::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pagebench.toml")).unwrap();
//! println!("Harvesting {} pages", config.harvest.page_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BenchConfig, CommandEntry, Config, ContextPolicy, ConvertConfig, HarvestConfig, RendererKind,
    WaitCondition,
};

// Re-export parser functions
pub use parser::{hash_content, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
