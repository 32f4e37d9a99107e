//! Markdown benchmark report
//!
//! The report combines the host environment, tool versions, corpus statistics
//! and the timing tool's output, which is embedded verbatim.

use crate::bench::EnvironmentInfo;
use crate::output::InputStats;
use crate::BenchError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Everything that goes into a benchmark report
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    /// Page the corpus links were taken from
    pub seed_url: String,

    /// Number of pages requested from the seed
    pub page_count: usize,

    /// Names of the benchmarked converters
    pub converters: Vec<String>,

    /// The timing command line, as a user would type it
    pub timing_command: String,

    pub environment: EnvironmentInfo,

    /// `(tool, version)` pairs
    pub versions: Vec<(String, String)>,

    pub inputs: InputStats,

    /// Raw timing tool output
    pub results: String,

    /// Hash of the configuration the run used
    pub config_hash: String,

    pub generated_at: DateTime<Utc>,
}

impl BenchmarkReport {
    /// Formats the report as Markdown
    pub fn render(&self) -> String {
        let mut md = String::new();

        md.push_str("# Benchmark\n\n");
        md.push_str(&format!(
            "An HTML-to-Markdown benchmark for {}.\n\n",
            join_names(&self.converters)
        ));

        md.push_str("### What does it do?\n\n");
        md.push_str(&format!(
            "- Fetch {} page links from <{}>\n",
            self.page_count, self.seed_url
        ));
        md.push_str(&format!(
            "- Fetch all {} pages and save them as HTML files\n",
            self.page_count
        ));
        md.push_str("- Bench using [hyperfine](https://github.com/sharkdp/hyperfine) and the following command:\n");
        md.push_str("  ```\n");
        for line in self.timing_command.lines() {
            md.push_str(&format!("  {}\n", line));
        }
        md.push_str("  ```\n\n");

        md.push_str("# Environment\n\n");
        md.push_str(&format!("System: {}\n\n", self.environment.platform));
        md.push_str(&format!("CPUs: {}\n\n", self.environment.cpu_summary()));
        md.push_str(&format!("Memory: {}\n\n", self.environment.memory_summary()));

        md.push_str("# Versions\n\n");
        for (tool, version) in &self.versions {
            md.push_str(&format!("{}: {}\n\n", tool, version));
        }

        md.push_str("# Inputs\n\n");
        md.push_str(&format!("File count: {}\n\n", self.inputs.file_count));
        md.push_str(&format!(
            "Total size: {:.2} MB\n\n",
            self.inputs.total_megabytes()
        ));

        md.push_str("# Results\n\n");
        md.push_str("```\n");
        md.push_str(self.results.trim_end());
        md.push_str("\n```\n\n");

        md.push_str(&format!(
            "*Updated at {}*\n\n",
            self.generated_at.format("%a, %d %b %Y %H:%M:%S GMT")
        ));
        md.push_str(&format!("*Config hash: `{}`*\n", self.config_hash));

        md
    }

    /// Renders the report and writes it to `path`, creating parent directories
    pub async fn write(&self, path: &Path) -> Result<(), BenchError> {
        let persist_error = |source| BenchError::Persist {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(persist_error)?;
        }
        tokio::fs::write(path, self.render())
            .await
            .map_err(persist_error)?;

        tracing::info!("Report written to {}", path.display());
        Ok(())
    }
}

/// "a", "a and b", "a, b and c"
fn join_names(names: &[String]) -> String {
    match names {
        [] => "no converters".to_string(),
        [only] => only.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}
