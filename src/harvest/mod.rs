//! Harvest module: builds the benchmark corpus from a seed page
//!
//! This module contains:
//! - Link extraction from the seed page
//! - Rendering backends behind the [`Renderer`] trait
//! - The resource fetcher with its per-fetch timeout
//! - The bounded task pool
//! - The fetch-and-persist pipeline tying them together

#[cfg(feature = "chromium")]
mod chromium;
mod fetcher;
mod http;
mod links;
mod pipeline;
mod pool;
mod render;

#[cfg(feature = "chromium")]
pub use chromium::ChromiumRenderer;
pub use fetcher::{FetchedPage, PageFetcher};
pub use http::HttpRenderer;
pub use links::extract_links;
pub use pipeline::{HarvestPipeline, HarvestReport};
pub use pool::TaskPool;
pub use render::{
    build_renderer, NavigateOptions, RenderContext, RenderedDocument, Renderer, WaitCondition,
};

use crate::config::HarvestConfig;
use crate::BenchError;

/// Runs a complete harvest with the configured renderer
///
/// # Arguments
///
/// * `config` - The harvest configuration
///
/// # Returns
///
/// * `Ok(HarvestReport)` - All discovered pages were saved
/// * `Err(BenchError)` - The run stopped; see [`HarvestPipeline::run`]
pub async fn harvest(config: &HarvestConfig) -> Result<HarvestReport, BenchError> {
    HarvestPipeline::from_config(config)?.run().await
}
