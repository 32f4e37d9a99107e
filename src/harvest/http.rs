//! Plain HTTP rendering backend
//!
//! Each context owns its own `reqwest` client, so no cookies or pooled
//! connections are shared between contexts. The body returned by the server
//! is the document; the title comes from its `<title>` element. Since the raw
//! response is exactly the initially parsed document, both wait conditions
//! behave the same here.

use crate::harvest::render::{NavigateOptions, RenderContext, RenderedDocument, Renderer};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

/// Renderer fetching pages with a fresh HTTP client per context
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    user_agent: String,
}

impl HttpRenderer {
    pub fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn launch(&self) -> Result<Box<dyn RenderContext>, FetchError> {
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        Ok(Box::new(HttpContext { client }))
    }
}

/// One isolated HTTP session
struct HttpContext {
    client: Client,
}

#[async_trait]
impl RenderContext for HttpContext {
    async fn open(
        &mut self,
        url: &str,
        options: &NavigateOptions,
    ) -> Result<RenderedDocument, FetchError> {
        let navigation_error = |e: reqwest::Error| classify_error(url, options, e);

        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US")
            .timeout(options.timeout)
            .send()
            .await
            .map_err(navigation_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(navigation_error)?;
        let title = extract_title(&body).unwrap_or_default();

        Ok(RenderedDocument::new(title, body))
    }

    async fn close(self: Box<Self>) -> Result<(), FetchError> {
        // Dropping the client tears down its connection pool.
        Ok(())
    }
}

/// Maps a transport error onto the fetch taxonomy
fn classify_error(url: &str, options: &NavigateOptions, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_ms: options.timeout.as_millis() as u64,
        }
    } else {
        FetchError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Reads the text of the first `<title>` element
fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}
