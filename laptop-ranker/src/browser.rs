//! Browser-automation seam used by the retailer adapters.
//!
//! A [`BrowserDriver`] hands out one independent [`BrowserSession`] per task.
//! The bundled [`HttpDriver`] renders pages with a plain HTTP fetch and answers
//! in-page queries from the static markup; automation back-ends that execute
//! scripts plug in behind the same traits.

use crate::config::ScrapeConfig;
use crate::fetcher::PageFetcher;
use crate::parser::{self, CardSelectorSpec, RawCard};
use crate::types::{RankerError, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

/// A document inside the page: the main frame or one embedded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRef {
    Main,
    Child(usize),
}

#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Main frame first, then embedded frames in document order.
    async fn frames(&self) -> Result<Vec<FrameRef>>;

    /// Clicks the first element matching `selector` inside `frame`.
    /// `Ok(false)` when nothing matched.
    async fn click(&mut self, frame: FrameRef, selector: &str) -> Result<bool>;

    /// Number of nodes matching `selector` in the main frame.
    async fn count(&self, selector: &str) -> Result<usize>;

    async fn scroll_to_bottom(&mut self) -> Result<()>;

    async fn page_height(&self) -> Result<u64>;

    /// Structured in-page extraction of product cards.
    async fn query_cards(&self, spec: &CardSelectorSpec) -> Result<Vec<RawCard>>;

    /// The fully rendered markup of the main frame.
    async fn content(&self) -> Result<String>;

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>>;
}

/// Navigates with a bounded timeout.
pub async fn navigate(session: &mut dyn BrowserSession, url: &str, config: &ScrapeConfig) -> Result<()> {
    let limit = config.navigation_timeout();
    match timeout(limit, session.goto(url, limit)).await {
        Ok(result) => result,
        Err(_) => Err(RankerError::Timeout {
            what: format!("navigation to {}", url),
            seconds: limit.as_secs(),
        }),
    }
}

/// Tries each consent selector in the main document and then every embedded
/// frame, stopping once `max_clicks` buttons were clicked. Returns the number
/// of clicks. Click errors are logged and skipped.
pub async fn dismiss_consent(
    session: &mut dyn BrowserSession,
    selectors: &[&str],
    max_clicks: usize,
) -> usize {
    let frames = match session.frames().await {
        Ok(frames) => frames,
        Err(e) => {
            debug!("Could not list frames for consent handling: {}", e);
            vec![FrameRef::Main]
        }
    };

    let mut clicks = 0;
    'frames: for frame in frames {
        for selector in selectors {
            if clicks >= max_clicks {
                break 'frames;
            }
            match session.click(frame, selector).await {
                Ok(true) => {
                    debug!("Dismissed consent via {} in {:?}", selector, frame);
                    clicks += 1;
                }
                Ok(false) => {}
                Err(e) => debug!("Consent click {} failed in {:?}: {}", selector, frame, e),
            }
        }
    }
    clicks
}

/// Polls until one of `selectors` matches or the card wait budget runs out.
/// Returns the selector that matched, if any.
pub async fn wait_for_any<'s>(
    session: &dyn BrowserSession,
    selectors: &[&'s str],
    config: &ScrapeConfig,
) -> Option<&'s str> {
    let deadline = Instant::now() + Duration::from_secs(config.card_wait_seconds);
    let poll = Duration::from_millis(config.card_poll_interval_ms.max(1));
    loop {
        for selector in selectors {
            if session.count(selector).await.unwrap_or(0) > 0 {
                return Some(*selector);
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        sleep(poll).await;
    }
}

/// Scrolls to the bottom until the page height stops changing or the step
/// budget is spent. Returns the number of scroll steps taken.
pub async fn lazy_scroll(session: &mut dyn BrowserSession, config: &ScrapeConfig) -> usize {
    let pause = Duration::from_millis(config.scroll_pause_ms);
    let mut last_height = 0;
    let mut steps = 0;
    while steps < config.scroll_steps {
        let height = match session.page_height().await {
            Ok(h) => h,
            Err(e) => {
                debug!("Page height unavailable, stopping scroll: {}", e);
                break;
            }
        };
        if height == last_height {
            break;
        }
        last_height = height;
        if let Err(e) = session.scroll_to_bottom().await {
            debug!("Scroll failed: {}", e);
            break;
        }
        steps += 1;
        if !pause.is_zero() {
            sleep(pause).await;
        }
    }
    steps
}

/// One way of turning a loaded page into raw cards.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(
        &self,
        session: &dyn BrowserSession,
        spec: &CardSelectorSpec,
    ) -> Result<Vec<RawCard>>;
}

/// Queries the live document.
pub struct StructuredQuery;

#[async_trait]
impl ExtractionStrategy for StructuredQuery {
    fn name(&self) -> &'static str {
        "structured"
    }

    async fn extract(
        &self,
        session: &dyn BrowserSession,
        spec: &CardSelectorSpec,
    ) -> Result<Vec<RawCard>> {
        session.query_cards(spec).await
    }
}

/// Re-parses the rendered markup.
pub struct StaticMarkup;

#[async_trait]
impl ExtractionStrategy for StaticMarkup {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn extract(
        &self,
        session: &dyn BrowserSession,
        spec: &CardSelectorSpec,
    ) -> Result<Vec<RawCard>> {
        let html = session.content().await?;
        parser::parse_cards(&html, spec)
    }
}

pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![Box::new(StructuredQuery), Box::new(StaticMarkup)]
}

/// Runs the strategies in order and keeps the first non-empty result.
pub async fn extract_cards(
    session: &dyn BrowserSession,
    spec: &CardSelectorSpec,
    strategies: &[Box<dyn ExtractionStrategy>],
) -> (Vec<RawCard>, Option<&'static str>) {
    for strategy in strategies {
        match strategy.extract(session, spec).await {
            Ok(cards) if !cards.is_empty() => {
                debug!("Strategy {} returned {} cards", strategy.name(), cards.len());
                return (cards, Some(strategy.name()));
            }
            Ok(_) => debug!("Strategy {} found no cards", strategy.name()),
            Err(e) => debug!("Strategy {} failed: {}", strategy.name(), e),
        }
    }
    (Vec::new(), None)
}

/// Sessions backed by plain HTTP fetches.
pub struct HttpDriver {
    fetcher: PageFetcher,
}

impl HttpDriver {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::new(config)?,
        })
    }
}

#[async_trait]
impl BrowserDriver for HttpDriver {
    async fn new_session(&self) -> Result<Box<dyn BrowserSession>> {
        Ok(Box::new(HttpSession {
            fetcher: self.fetcher.clone(),
            html: None,
        }))
    }
}

/// A single-frame page that cannot click and never grows when scrolled.
pub struct HttpSession {
    fetcher: PageFetcher,
    html: Option<String>,
}

impl HttpSession {
    fn html(&self) -> Result<&str> {
        self.html
            .as_deref()
            .ok_or_else(|| RankerError::Browser("no page loaded".to_string()))
    }
}

fn count_matches(html: &str, selector: &str) -> Result<usize> {
    let selector = Selector::parse(selector)
        .map_err(|e| RankerError::Selector(format!("{}: {:?}", selector, e)))?;
    Ok(Html::parse_document(html).select(&selector).count())
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.html = Some(self.fetcher.fetch_page(url).await?);
        Ok(())
    }

    async fn frames(&self) -> Result<Vec<FrameRef>> {
        Ok(vec![FrameRef::Main])
    }

    async fn click(&mut self, _frame: FrameRef, _selector: &str) -> Result<bool> {
        Ok(false)
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        count_matches(self.html()?, selector)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        Ok(())
    }

    async fn page_height(&self) -> Result<u64> {
        Ok(self.html.as_ref().map(|h| h.len() as u64).unwrap_or(0))
    }

    async fn query_cards(&self, spec: &CardSelectorSpec) -> Result<Vec<RawCard>> {
        parser::parse_cards(self.html()?, spec)
    }

    async fn content(&self) -> Result<String> {
        self.html().map(str::to_string)
    }
}
