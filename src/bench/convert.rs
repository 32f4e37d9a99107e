//! Batch conversion with an external document converter
//!
//! Every `.html` file in the input directory is converted by its own process
//! (`<program> <file> --from <from> --to <to> --output <stem>.md`). At most
//! `concurrency` processes are alive at once.

use crate::bench::tools::run_program;
use crate::config::ConvertConfig;
use crate::harvest::TaskPool;
use crate::output::stats::is_html_file;
use crate::{BenchError, ToolError};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of a batch conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Files converted, in input order
    pub outputs: Vec<PathBuf>,

    pub elapsed: Duration,
}

/// Converts a directory of HTML files with an external program
#[derive(Debug, Clone)]
pub struct BatchConverter {
    program: String,
    from: String,
    to: String,
    output_dir: PathBuf,
    pool: TaskPool,
}

impl BatchConverter {
    pub fn new(config: &ConvertConfig) -> Self {
        Self {
            program: config.program.clone(),
            from: config.from.clone(),
            to: config.to.clone(),
            output_dir: PathBuf::from(&config.output_dir),
            pool: TaskPool::new(config.concurrency),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Converts every `.html` file directly inside `input_dir`
    ///
    /// # Returns
    ///
    /// * `Ok(ConversionSummary)` - Every file converted
    /// * `Err(BenchError::Io)` - The input directory could not be listed
    /// * `Err(BenchError::Persist)` - The output directory could not be created
    /// * `Err(BenchError::Tool)` - A conversion process failed
    pub async fn convert_dir(&self, input_dir: &Path) -> Result<ConversionSummary, BenchError> {
        let start = Instant::now();
        let inputs = list_html_files(input_dir).await?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| BenchError::Persist {
                path: self.output_dir.clone(),
                source,
            })?;

        let tasks: Vec<_> = inputs
            .iter()
            .map(|input| move || self.convert_file(input))
            .collect();

        let outputs = self.pool.run(tasks).await?;
        let elapsed = start.elapsed();

        tracing::info!(
            "Converted {} files in {}ms",
            outputs.len(),
            elapsed.as_millis()
        );

        Ok(ConversionSummary { outputs, elapsed })
    }

    /// Path of the Markdown file produced for `input`
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or(input.as_os_str());
        let mut name = stem.to_os_string();
        name.push(".md");
        self.output_dir.join(name)
    }

    async fn convert_file(&self, input: &Path) -> Result<PathBuf, ToolError> {
        let output = self.output_path(input);
        run_program(
            &self.program,
            [
                input.as_os_str(),
                "--from".as_ref(),
                self.from.as_ref(),
                "--to".as_ref(),
                self.to.as_ref(),
                "--output".as_ref(),
                output.as_os_str(),
            ],
        )
        .await?;
        Ok(output)
    }
}

/// Lists `.html` files directly inside `dir`, sorted by name
async fn list_html_files(dir: &Path) -> Result<Vec<PathBuf>, BenchError> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_html_file(&path) && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
