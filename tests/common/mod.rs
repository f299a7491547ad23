//! In-memory browser for driving crawls against canned result pages.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use qa_crawler::browser::{BrowserSession, ENTER};
use qa_crawler::config::{CrawlSettings, BLOCK_NOTICE};
use qa_crawler::session::search_url_for;

pub const BASE: &str = "http://search.test/";

/// Handle to the `index`-th match of `selector` on the page that was loaded
/// when it was looked up.
#[derive(Debug, Clone)]
pub struct FakeElement {
    generation: u64,
    selector: String,
    index: usize,
}

/// Serves registered pages by URL; anything else is a blank page.
///
/// Pressing Enter in any element searches for the keys typed since the last
/// navigation. Clicking an element with an `href` follows it.
#[derive(Debug)]
pub struct FakeBrowser {
    base: Url,
    pages: HashMap<String, String>,
    current: String,
    generation: u64,
    typed: String,
    pub visited: Vec<String>,
    pub submitted: Vec<String>,
    pub keystrokes: usize,
    pub clicks: usize,
    pub hovers: usize,
    block_from_visit: Option<usize>,
    blocked: String,
    enter_submits: bool,
    quit_fails: bool,
    quit: Arc<AtomicBool>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self {
            base: Url::parse(BASE).unwrap(),
            pages: HashMap::new(),
            current: "about:blank".to_string(),
            generation: 0,
            typed: String::new(),
            visited: Vec::new(),
            submitted: Vec::new(),
            keystrokes: 0,
            clicks: 0,
            hovers: 0,
            block_from_visit: None,
            blocked: blocked_page(),
            enter_submits: true,
            quit_fails: false,
            quit: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(normalize(url), html.into());
        self
    }

    /// Register the page a search for `query` lands on.
    pub fn with_search(self, query: &str, html: impl Into<String>) -> Self {
        let url = search_url_for(&self.base, query);
        self.with_page(url.as_str(), html)
    }

    /// Serve the unusual traffic notice from the `visit`-th navigation on.
    pub fn blocked_from_visit(mut self, visit: usize) -> Self {
        self.block_from_visit = Some(visit);
        self
    }

    /// Make Enter a no-op, as when the search form never reacts.
    pub fn ignoring_enter(mut self) -> Self {
        self.enter_submits = false;
        self
    }

    /// Make `quit` report a driver failure after closing.
    pub fn failing_quit(mut self) -> Self {
        self.quit_fails = true;
        self
    }

    /// Flag raised once the session has been quit.
    pub fn quit_flag(&self) -> Arc<AtomicBool> {
        self.quit.clone()
    }

    pub fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            search_url: self.base.clone(),
            ..CrawlSettings::default()
        }
    }

    pub fn url_of(&self, path_and_query: &str) -> String {
        self.base.join(path_and_query).unwrap().to_string()
    }

    fn navigate(&mut self, url: &str) {
        let url = normalize(url);
        self.visited.push(url.clone());
        self.current = url;
        self.generation += 1;
        self.typed.clear();
    }

    fn document(&self) -> Html {
        Html::parse_document(self.source())
    }

    fn source(&self) -> &str {
        if matches!(self.block_from_visit, Some(visit) if self.visited.len() >= visit) {
            return &self.blocked;
        }
        self.pages
            .get(&self.current)
            .map(String::as_str)
            .unwrap_or("<html><body></body></html>")
    }

    fn resolve<T>(
        &self,
        element: &FakeElement,
        read: impl FnOnce(scraper::ElementRef<'_>) -> T,
    ) -> Result<T> {
        if element.generation != self.generation {
            return Err(anyhow!("stale element reference: {}", element.selector));
        }
        let selector = css(&element.selector)?;
        let document = self.document();
        let found = document
            .select(&selector)
            .nth(element.index)
            .ok_or_else(|| anyhow!("no such element: {}", element.selector))?;
        Ok(read(found))
    }
}

#[async_trait]
impl BrowserSession for FakeBrowser {
    type Element = FakeElement;

    async fn goto(&mut self, url: &str) -> Result<()> {
        self.navigate(url);
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.current.clone())
    }

    async fn page_source(&mut self) -> Result<String> {
        Ok(self.source().to_string())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<FakeElement>> {
        let compiled = css(selector)?;
        let count = self.document().select(&compiled).count();
        Ok((0..count)
            .map(|index| FakeElement {
                generation: self.generation,
                selector: selector.to_string(),
                index,
            })
            .collect())
    }

    async fn text(&mut self, element: &FakeElement) -> Result<String> {
        self.resolve(element, |found| found.text().collect())
    }

    async fn attribute(&mut self, element: &FakeElement, name: &str) -> Result<Option<String>> {
        self.resolve(element, |found| found.value().attr(name).map(str::to_string))
    }

    async fn hover(&mut self, element: &FakeElement) -> Result<()> {
        self.resolve(element, |_| ())?;
        self.hovers += 1;
        Ok(())
    }

    async fn click(&mut self, element: &FakeElement) -> Result<()> {
        let href = self.resolve(element, |found| found.value().attr("href").map(str::to_string))?;
        self.clicks += 1;
        if let Some(href) = href {
            let target = Url::parse(&self.current)?.join(&href)?;
            self.navigate(target.as_str());
        }
        Ok(())
    }

    async fn clear(&mut self, element: &FakeElement) -> Result<()> {
        self.resolve(element, |_| ())?;
        self.typed.clear();
        Ok(())
    }

    async fn send_keys(&mut self, element: &FakeElement, text: &str) -> Result<()> {
        self.resolve(element, |_| ())?;
        self.keystrokes += 1;
        if text == ENTER {
            if !self.enter_submits {
                return Ok(());
            }
            let query = std::mem::take(&mut self.typed);
            let target = search_url_for(&self.base, &query);
            self.submitted.push(query);
            self.navigate(target.as_str());
        } else {
            self.typed.push_str(text);
        }
        Ok(())
    }

    async fn is_stale(&mut self, element: &FakeElement) -> Result<bool> {
        Ok(element.generation != self.generation)
    }

    async fn quit(self) -> Result<()>
    where
        Self: Sized,
    {
        self.quit.store(true, Ordering::SeqCst);
        if self.quit_fails {
            return Err(anyhow!("session not created: chrome not reachable"));
        }
        Ok(())
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.to_string())
        .unwrap_or_else(|_| url.to_string())
}

fn css(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid selector `{}`: {:?}", selector, e))
}

pub fn front_page() -> String {
    r#"<html><body><form><input id="lst-ib" name="q"></form></body></html>"#.to_string()
}

/// Non-scripted empty search page carrying the search box.
pub fn plain_front_page() -> String {
    r#"<html><body><form><div id="sbhost"><input name="q"></div></form></body></html>"#.to_string()
}

pub fn blocked_page() -> String {
    format!(
        "<html><body><p>{}. Please try your request again later.</p></body></html>",
        BLOCK_NOTICE
    )
}

/// Scripted result page with one `.rc` container per `(title, url)` and an
/// optional `#pnnext` control.
pub fn scripted_page(results: &[(&str, &str)], next_href: Option<&str>) -> String {
    let items: String = results
        .iter()
        .map(|(title, url)| {
            format!(
                r#"<div class="g"><div class="rc"><h3 class="r"><a href="{url}">{title}</a></h3><span class="st">About {title}</span></div></div>"#
            )
        })
        .collect();
    let next = next_href
        .map(|href| format!(r#"<a id="pnnext" href="{href}">Next</a>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body><input id="lst-ib" name="q"><div id="search">{items}</div><div id="nav">{next}</div></body></html>"#
    )
}

/// Non-scripted result page: `.g` containers and a trailing row of `.fl`
/// navigation links given as `(label, href)`.
pub fn plain_page(results: &[(&str, &str)], nav: &[(&str, &str)]) -> String {
    let items: String = results
        .iter()
        .map(|(title, url)| {
            format!(r#"<div class="g"><h3 class="r"><a href="{url}">{title}</a></h3></div>"#)
        })
        .collect();
    let links: String = nav
        .iter()
        .map(|(label, href)| format!(r#"<a class="fl" href="{href}">{label}</a>"#))
        .collect();
    format!(
        r#"<html><body><div id="sbhost"><input name="q"></div><div id="ires">{items}</div><table id="nav"><tr><td>{links}</td></tr></table></body></html>"#
    )
}
