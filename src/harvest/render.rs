//! Rendering client abstraction
//!
//! A [`Renderer`] launches isolated [`RenderContext`]s; a context opens one URL
//! at a time and hands back the page title and serialized document.

use crate::config::{HarvestConfig, RendererKind};
use crate::FetchError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use crate::config::WaitCondition;

/// Options applied to a single navigation
#[derive(Debug, Clone, Copy)]
pub struct NavigateOptions {
    pub wait: WaitCondition,
    pub timeout: Duration,
}

impl NavigateOptions {
    /// Waits for DOMContentLoaded, bounded by `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            wait: WaitCondition::DomContentLoaded,
            timeout,
        }
    }

    pub fn with_wait(mut self, wait: WaitCondition) -> Self {
        self.wait = wait;
        self
    }
}

/// A page as read from a rendering context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    title: String,
    content: String,
}

impl RenderedDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn into_parts(self) -> (String, String) {
        (self.title, self.content)
    }
}

/// Launches isolated rendering contexts
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Starts a new context sharing no session state with any other
    async fn launch(&self) -> Result<Box<dyn RenderContext>, FetchError>;
}

/// A live rendering session
#[async_trait]
pub trait RenderContext: Send {
    /// Navigates to `url` and reads the resulting document
    async fn open(
        &mut self,
        url: &str,
        options: &NavigateOptions,
    ) -> Result<RenderedDocument, FetchError>;

    /// Releases everything the context holds
    async fn close(self: Box<Self>) -> Result<(), FetchError>;
}

/// Builds the renderer selected in the harvest configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn Renderer>)` - The configured backend
/// * `Err(FetchError::Launch)` - The backend is not compiled into this binary
pub fn build_renderer(config: &HarvestConfig) -> Result<Arc<dyn Renderer>, FetchError> {
    match config.renderer {
        RendererKind::Http => Ok(Arc::new(super::http::HttpRenderer::new(
            &config.user_agent,
        ))),
        #[cfg(feature = "chromium")]
        RendererKind::Chromium => Ok(Arc::new(super::chromium::ChromiumRenderer::new(
            config.browser_args.clone(),
        ))),
        #[cfg(not(feature = "chromium"))]
        RendererKind::Chromium => Err(FetchError::Launch(
            "the chromium renderer requires building with `--features chromium`".to_string(),
        )),
    }
}
