//! In-memory rendering backend for pipeline tests

use async_trait::async_trait;
use pagebench::harvest::{NavigateOptions, RenderContext, RenderedDocument, Renderer};
use pagebench::FetchError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SEED: &str = "https://fake.test/wiki/Seed";

/// How the fake web answers one URL
#[derive(Debug, Clone)]
pub enum Reply {
    Page {
        title: String,
        html: String,
        delay: Duration,
    },
    /// Never answers; only the fetcher timeout ends the navigation
    Hang,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(String),
    Finish(String),
}

/// Shared state observed by the tests
#[derive(Debug, Default)]
pub struct FakeWeb {
    replies: Mutex<HashMap<String, Reply>>,
    events: Mutex<Vec<Event>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    launches: AtomicUsize,
    closes: AtomicUsize,
}

impl FakeWeb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn page(&self, url: &str, title: &str, delay_ms: u64) {
        self.reply(
            url,
            Reply::Page {
                title: title.to_string(),
                html: format!(
                    "<html><head><title>{}</title></head><body>{}</body></html>",
                    title, url
                ),
                delay: Duration::from_millis(delay_ms),
            },
        );
    }

    /// Registers the seed page linking to `/wiki/Page_0` .. `/wiki/Page_{n-1}`
    pub fn seed_with_links(&self, n: usize) -> Vec<String> {
        let anchors: String = (0..n)
            .map(|i| format!("<a href=\"/wiki/Page_{}\">Page {}</a>\n", i, i))
            .collect();
        self.reply(
            SEED,
            Reply::Page {
                title: "Seed".to_string(),
                html: format!("<html><body>{}</body></html>", anchors),
                delay: Duration::ZERO,
            },
        );
        (0..n)
            .map(|i| format!("https://fake.test/wiki/Page_{}", i))
            .collect()
    }

    pub fn reply(&self, url: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(url.to_string(), reply);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// URLs whose navigation started, in order
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Start(url) => Some(url),
                Event::Finish(_) => None,
            })
            .collect()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct FakeRenderer(pub Arc<FakeWeb>);

#[async_trait]
impl Renderer for FakeRenderer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn launch(&self) -> Result<Box<dyn RenderContext>, FetchError> {
        self.0.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeContext {
            web: Arc::clone(&self.0),
        }))
    }
}

struct FakeContext {
    web: Arc<FakeWeb>,
}

/// Decrements the in-flight gauge even when the navigation is dropped
struct InFlight<'a>(&'a FakeWeb);

impl<'a> InFlight<'a> {
    fn enter(web: &'a FakeWeb) -> Self {
        let now = web.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        web.peak.fetch_max(now, Ordering::SeqCst);
        Self(web)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RenderContext for FakeContext {
    async fn open(
        &mut self,
        url: &str,
        _options: &NavigateOptions,
    ) -> Result<RenderedDocument, FetchError> {
        let _guard = InFlight::enter(&self.web);
        self.web.record(Event::Start(url.to_string()));

        let reply = self.web.replies.lock().unwrap().get(url).cloned();
        let result = match reply {
            Some(Reply::Page { title, html, delay }) => {
                tokio::time::sleep(delay).await;
                Ok(RenderedDocument::new(title, html))
            }
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FetchError::Navigation {
                    url: url.to_string(),
                    message: "hung".to_string(),
                })
            }
            Some(Reply::Fail) | None => Err(FetchError::Navigation {
                url: url.to_string(),
                message: "HTTP 500".to_string(),
            }),
        };

        self.web.record(Event::Finish(url.to_string()));
        result
    }

    async fn close(self: Box<Self>) -> Result<(), FetchError> {
        self.web.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
