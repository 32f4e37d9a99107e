//! Resource fetcher
//!
//! Turns a URL into a [`FetchedPage`] through a [`Renderer`]. The navigation is
//! bounded by the configured timeout and the rendering context is released on
//! every path, whether the fetch succeeded, failed, or timed out.

use crate::config::{ContextPolicy, HarvestConfig};
use crate::harvest::render::{
    build_renderer, NavigateOptions, RenderContext, Renderer, WaitCondition,
};
use crate::FetchError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL requested
    pub url: String,

    /// Document title, possibly empty
    pub title: String,

    /// Serialized document
    pub html: String,
}

/// Fetches single pages through a rendering backend
pub struct PageFetcher {
    renderer: Arc<dyn Renderer>,
    options: NavigateOptions,
    policy: ContextPolicy,
    idle: Mutex<Vec<Box<dyn RenderContext>>>,
}

impl PageFetcher {
    /// Creates a fetcher with a per-navigation `timeout`
    pub fn new(renderer: Arc<dyn Renderer>, timeout: Duration, policy: ContextPolicy) -> Self {
        Self {
            renderer,
            options: NavigateOptions::new(timeout),
            policy,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Sets the load stage navigations wait for
    pub fn with_wait(mut self, wait: WaitCondition) -> Self {
        self.options = self.options.with_wait(wait);
        self
    }

    /// Creates a fetcher using the renderer, timeout and wait condition from
    /// the configuration
    pub fn from_config(config: &HarvestConfig) -> Result<Self, FetchError> {
        let renderer = build_renderer(config)?;
        Ok(Self::new(
            renderer,
            Duration::from_millis(config.timeout_ms),
            config.context_policy,
        )
        .with_wait(config.wait_until))
    }

    /// Fetches the title and content of `url`
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - The page was read within the timeout
    /// * `Err(FetchError::Timeout)` - Navigation exceeded the timeout
    /// * `Err(FetchError)` - The context could not be launched or navigation failed
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut context = self.acquire().await?;
        tracing::debug!("Fetching {} via {}", url, self.renderer.name());

        let outcome = match tokio::time::timeout(
            self.options.timeout,
            context.open(url, &self.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.options.timeout.as_millis() as u64,
            }),
        };

        self.release(context, outcome.is_ok()).await;

        let document = outcome?;
        let (title, html) = document.into_parts();
        Ok(FetchedPage {
            url: url.to_string(),
            title,
            html,
        })
    }

    /// Closes all idle contexts kept by the `reuse` policy
    pub async fn shutdown(&self) {
        let idle = std::mem::take(&mut *self.lock_idle());
        for context in idle {
            close_quietly(context).await;
        }
    }

    /// Number of contexts waiting to be reused
    pub fn idle_contexts(&self) -> usize {
        self.lock_idle().len()
    }

    async fn acquire(&self) -> Result<Box<dyn RenderContext>, FetchError> {
        if self.policy == ContextPolicy::Reuse {
            let reused = self.lock_idle().pop();
            if let Some(context) = reused {
                return Ok(context);
            }
        }
        self.renderer.launch().await
    }

    async fn release(&self, context: Box<dyn RenderContext>, healthy: bool) {
        if self.policy == ContextPolicy::Reuse && healthy {
            self.lock_idle().push(context);
        } else {
            close_quietly(context).await;
        }
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<Box<dyn RenderContext>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn close_quietly(context: Box<dyn RenderContext>) {
    if let Err(e) = context.close().await {
        tracing::warn!("Failed to close rendering context: {}", e);
    }
}
