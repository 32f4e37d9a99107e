//! Output module for harvested pages and benchmark reports
//!
//! This module handles:
//! - Turning page titles into safe, unique filenames
//! - Writing harvested pages into a fresh output directory
//! - Measuring the input corpus
//! - Rendering the Markdown benchmark report

mod report;
mod sanitize;
mod sink;
pub mod stats;

pub use report::BenchmarkReport;
pub use sanitize::sanitize;
pub use sink::{CollisionTable, FilesystemSink};
pub use stats::InputStats;
