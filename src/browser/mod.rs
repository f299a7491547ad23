//! The browser primitives the crawler needs, and bounded waits built on them.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::error;

pub mod webdriver;

pub use webdriver::{BrowserOptions, DriverType, WebDriverSession};

/// One browser with exactly one current page, used strictly sequentially.
#[async_trait]
pub trait BrowserSession: Send {
    type Element: Clone + Send + Sync;

    /// Navigate and block until the browser reports the page loaded.
    async fn goto(&mut self, url: &str) -> Result<()>;
    async fn current_url(&mut self) -> Result<String>;
    async fn page_source(&mut self) -> Result<String>;
    async fn find_all(&mut self, selector: &str) -> Result<Vec<Self::Element>>;
    async fn text(&mut self, element: &Self::Element) -> Result<String>;
    async fn attribute(&mut self, element: &Self::Element, name: &str) -> Result<Option<String>>;
    /// Move the pointer over the element.
    async fn hover(&mut self, element: &Self::Element) -> Result<()>;
    /// Clicks do not wait for whatever navigation they trigger.
    async fn click(&mut self, element: &Self::Element) -> Result<()>;
    async fn clear(&mut self, element: &Self::Element) -> Result<()>;
    async fn send_keys(&mut self, element: &Self::Element, text: &str) -> Result<()>;
    /// True once the element has been detached from the current page.
    async fn is_stale(&mut self, element: &Self::Element) -> Result<bool>;
    async fn quit(self) -> Result<()>
    where
        Self: Sized;
}

/// Quit on an error path. The error that got us here is the one reported, so
/// a failing quit is only logged.
pub async fn close_after_failure<S: BrowserSession>(session: S) {
    if let Err(err) = session.quit().await {
        error!("Failed to close the browser: {:#}", err);
    }
}

/// WebDriver code point for the Enter key.
pub const ENTER: &str = "\u{e007}";

/// Polling parameters shared by the bounded waits.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    pub timeout: Duration,
    pub poll: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, poll: Duration) -> Self {
        Self { timeout, poll }
    }
}

/// Poll until an element matching `selector` is present. `None` on timeout.
pub async fn wait_for_element<S: BrowserSession>(
    session: &mut S,
    selector: &str,
    wait: Wait,
) -> Result<Option<S::Element>> {
    let deadline = Instant::now() + wait.timeout;
    loop {
        if let Some(element) = session.find_all(selector).await?.into_iter().next() {
            return Ok(Some(element));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(wait.poll).await;
    }
}

/// Poll until `element` goes stale. `false` on timeout.
pub async fn wait_for_staleness<S: BrowserSession>(
    session: &mut S,
    element: &S::Element,
    wait: Wait,
) -> Result<bool> {
    let deadline = Instant::now() + wait.timeout;
    loop {
        if session.is_stale(element).await? {
            return Ok(true);
        }
        if Instant::now() >= deadline {
            return Ok(false);
        }
        sleep(wait.poll).await;
    }
}
