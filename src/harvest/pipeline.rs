//! Fetch-and-persist pipeline
//!
//! A run moves through fixed stages:
//!
//! 1. **Init**: the output directory is cleared and recreated
//! 2. **Discover**: the seed page is fetched and its links extracted
//! 3. **Dispatch**: links are split into batches of `batch_size`; each batch
//!    runs on a [`TaskPool`] with the same ceiling, and the next batch starts
//!    only once the previous one has settled
//! 4. **Persist**: inside each task the page title is sanitized, a unique
//!    name is claimed and the document is written as `<name>.html`
//!
//! A failed fetch fails its batch and ends the run. Pages already written by
//! the batch's other tasks stay on disk.

use crate::config::HarvestConfig;
use crate::harvest::fetcher::PageFetcher;
use crate::harvest::links::extract_links;
use crate::harvest::pool::TaskPool;
use crate::output::{sanitize, FilesystemSink};
use crate::BenchError;
use std::path::PathBuf;
use url::Url;

/// Name used when a title sanitizes to nothing
const FALLBACK_IDENTIFIER: &str = "untitled";

/// Outcome of a completed harvest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Links found on the seed page
    pub discovered: usize,

    /// Number of batches dispatched
    pub batches: usize,

    /// Files written, batch by batch in link order
    pub persisted: Vec<PathBuf>,
}

/// Harvests the pages linked from a seed page into a directory
pub struct HarvestPipeline {
    fetcher: PageFetcher,
    seed_url: Url,
    page_count: usize,
    batch_size: usize,
    output_dir: PathBuf,
}

impl HarvestPipeline {
    /// Creates a pipeline driving `fetcher` with the given harvest settings
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestPipeline)` - Ready to run
    /// * `Err(BenchError::UrlParse)` - The seed URL is not a valid absolute URL
    pub fn new(fetcher: PageFetcher, config: &HarvestConfig) -> Result<Self, BenchError> {
        Ok(Self {
            fetcher,
            seed_url: Url::parse(&config.seed_url)?,
            page_count: config.page_count,
            batch_size: config.batch_size.max(1),
            output_dir: PathBuf::from(&config.output_dir),
        })
    }

    /// Creates a pipeline with the renderer selected in the configuration
    pub fn from_config(config: &HarvestConfig) -> Result<Self, BenchError> {
        let fetcher = PageFetcher::from_config(config)?;
        Self::new(fetcher, config)
    }

    /// Runs the pipeline to completion
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestReport)` - Every discovered page was fetched and written
    /// * `Err(BenchError::Persist)` - The output directory or a file could not be written
    /// * `Err(BenchError::Discovery)` - The seed page could not be fetched
    /// * `Err(BenchError::Fetch)` - A page in some batch failed; earlier writes remain
    pub async fn run(&self) -> Result<HarvestReport, BenchError> {
        let outcome = self.run_stages().await;
        self.fetcher.shutdown().await;
        outcome
    }

    async fn run_stages(&self) -> Result<HarvestReport, BenchError> {
        let sink = FilesystemSink::create_fresh(&self.output_dir, "html").await?;

        let links = self.discover().await?;
        tracing::info!("Got {} links from {}", links.len(), self.seed_url);

        let pool = TaskPool::new(self.batch_size);
        let mut report = HarvestReport {
            discovered: links.len(),
            ..HarvestReport::default()
        };

        for (batch_index, batch) in links.chunks(self.batch_size).enumerate() {
            let start = batch_index * self.batch_size;
            tracing::info!(
                "Fetching pages from index {} to {}",
                start,
                start + batch.len()
            );
            report.batches += 1;

            let tasks: Vec<_> = batch
                .iter()
                .map(|url| {
                    let fetcher = &self.fetcher;
                    let sink = &sink;
                    move || persist_page(fetcher, sink, url)
                })
                .collect();

            match pool.run(tasks).await {
                Ok(paths) => report.persisted.extend(paths),
                Err(e) => {
                    tracing::error!("Batch {} (index {}) failed: {}", batch_index, start, e);
                    return Err(e);
                }
            }
        }

        tracing::info!(
            "Saved {} pages to {} in {} batches",
            report.persisted.len(),
            self.output_dir.display(),
            report.batches
        );

        Ok(report)
    }

    /// Fetches the seed page and extracts the work list
    async fn discover(&self) -> Result<Vec<String>, BenchError> {
        let seed = self
            .fetcher
            .fetch(self.seed_url.as_str())
            .await
            .map_err(|source| BenchError::Discovery {
                url: self.seed_url.to_string(),
                source,
            })?;

        Ok(extract_links(&self.seed_url, &seed.html, self.page_count))
    }
}

/// Fetches one page and writes it under its sanitized title
async fn persist_page(
    fetcher: &PageFetcher,
    sink: &FilesystemSink,
    url: &str,
) -> Result<PathBuf, BenchError> {
    let page = fetcher.fetch(url).await?;

    let mut identifier = sanitize(&page.title);
    if identifier.is_empty() {
        tracing::debug!("Title of {} is unusable, saving as {}", url, FALLBACK_IDENTIFIER);
        identifier = FALLBACK_IDENTIFIER.to_string();
    }

    sink.write(&identifier, page.html.as_bytes()).await
}
