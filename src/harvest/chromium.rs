//! Headless Chromium rendering backend
//!
//! Every context is a separate browser process. Its CDP event handler runs on
//! a spawned task that lives exactly as long as the context.

use crate::harvest::render::{
    NavigateOptions, RenderContext, RenderedDocument, Renderer, WaitCondition,
};
use crate::FetchError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use futures::StreamExt;
use tokio::task::JoinHandle;

/// Renderer launching one headless browser per context
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    args: Vec<String>,
}

impl ChromiumRenderer {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn launch(&self) -> Result<Box<dyn RenderContext>, FetchError> {
        let config = BrowserConfig::builder()
            .args(self.args.iter().map(String::as_str))
            .build()
            .map_err(FetchError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler stopped: {}", e);
                    break;
                }
            }
        });

        Ok(Box::new(ChromiumContext {
            browser,
            handler_task,
        }))
    }
}

/// One browser process and its event loop
struct ChromiumContext {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn open(
        &mut self,
        url: &str,
        options: &NavigateOptions,
    ) -> Result<RenderedDocument, FetchError> {
        let navigation_error = |e: chromiumoxide::error::CdpError| FetchError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(navigation_error)?;

        let navigation = async {
            match options.wait {
                WaitCondition::Load => {
                    page.goto(url).await.map_err(navigation_error)?;
                }
                WaitCondition::DomContentLoaded => {
                    // `goto` waits for the load event; navigate directly and
                    // stop at the first DOMContentLoaded instead
                    let mut dom_ready = page
                        .event_listener::<EventDomContentEventFired>()
                        .await
                        .map_err(navigation_error)?;
                    let navigated = page
                        .execute(NavigateParams::new(url))
                        .await
                        .map_err(navigation_error)?;
                    if let Some(message) = navigated.result.error_text.clone() {
                        return Err(FetchError::Navigation {
                            url: url.to_string(),
                            message,
                        });
                    }
                    dom_ready.next().await;
                }
            }
            let title = page
                .get_title()
                .await
                .map_err(navigation_error)?
                .unwrap_or_default();
            let content = page.content().await.map_err(navigation_error)?;
            Ok(RenderedDocument::new(title, content))
        };

        let outcome = match tokio::time::timeout(options.timeout, navigation).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: options.timeout.as_millis() as u64,
            }),
        };

        if let Err(e) = page.close().await {
            tracing::warn!("Failed to close page for {}: {}", url, e);
        }

        outcome
    }

    async fn close(self: Box<Self>) -> Result<(), FetchError> {
        let ChromiumContext {
            mut browser,
            handler_task,
        } = *self;

        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| FetchError::Launch(format!("failed to close browser: {}", e)));

        if let Err(e) = browser.wait().await {
            tracing::warn!("Browser process did not exit cleanly: {}", e);
        }
        handler_task.abort();

        closed
    }
}
