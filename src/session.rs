//! Submitting one query and collecting its result pages.

use tracing::{debug, error};
use url::Url;

use crate::browser::{self, BrowserSession, Wait, ENTER};
use crate::config::{CrawlSettings, SubmissionStrategy, BLOCK_NOTICE};
use crate::dom::{PageLayout, RenderingMode};
use crate::error::CrawlError;
use crate::models::Query;
use crate::pacing;
use crate::pagination::{PaginationOutcome, Paginator};

pub struct QuerySession<'a, S: BrowserSession> {
    session: &'a mut S,
    settings: &'a CrawlSettings,
    layout: &'static PageLayout,
}

impl<'a, S: BrowserSession> QuerySession<'a, S> {
    pub fn new(session: &'a mut S, settings: &'a CrawlSettings) -> Self {
        Self {
            session,
            settings,
            layout: PageLayout::for_mode(settings.rendering_mode),
        }
    }

    pub async fn run(mut self, query: &Query) -> Result<PaginationOutcome, CrawlError> {
        let entry = entry_point(&self.settings.search_url, self.settings.rendering_mode);
        self.session.goto(entry.as_str()).await?;
        ensure_not_blocked(&mut *self.session).await?;

        let search_box = wait_for_required(
            &mut *self.session,
            self.layout.search_box,
            self.settings.element_wait(),
        )
        .await?;
        self.submit(&query.text, &search_box).await?;
        ensure_not_blocked(&mut *self.session).await?;

        Paginator::new(self.session, self.settings).run().await
    }

    async fn submit(&mut self, text: &str, search_box: &S::Element) -> Result<(), CrawlError> {
        match self.settings.submission {
            SubmissionStrategy::WholeString => {
                self.session.clear(search_box).await?;
                self.session.send_keys(search_box, text).await?;
                self.session.send_keys(search_box, ENTER).await?;
            }
            SubmissionStrategy::Typed => {
                self.session.hover(search_box).await?;
                self.session.click(search_box).await?;
                pacing::type_like_human(
                    &mut *self.session,
                    search_box,
                    text,
                    self.settings.keystroke_delay,
                    self.settings.keystroke_jitter,
                )
                .await?;
                // Results of a previous query may still be on the page.
                let stale_candidates = self.session.find_all(self.layout.result_container).await?;
                self.session.send_keys(search_box, ENTER).await?;
                if let Some(first) = stale_candidates.first() {
                    debug!("wait for staleness after submitting search query");
                    let wait = self.settings.staleness_wait();
                    if !browser::wait_for_staleness(&mut *self.session, first, wait).await? {
                        return Err(CrawlError::staleness_timeout(
                            self.layout.result_container,
                            wait.timeout,
                        ));
                    }
                    debug!("staleness ended");
                }
            }
        }
        Ok(())
    }
}

/// The search front page, or an empty query without scripting: going
/// through a search first lands on the non-scripted site and skips the
/// cookie consent interstitial.
pub fn entry_point(search_url: &Url, mode: RenderingMode) -> Url {
    match mode {
        RenderingMode::Scripted => search_url.clone(),
        RenderingMode::NonScripted => search_url_for(search_url, " "),
    }
}

/// `{search_url}/search?q={query}` with the query percent-encoded.
pub fn search_url_for(search_url: &Url, query: &str) -> Url {
    let mut url = search_url.clone();
    url.set_path("/search");
    url.set_query(Some(&format!("q={}", urlencoding::encode(query))));
    url
}

/// Fail if the loaded page is the engine's automated-traffic notice. Checked
/// after every navigation: entry point, submission and page advance.
pub async fn ensure_not_blocked<S: BrowserSession>(session: &mut S) -> Result<(), CrawlError> {
    if session.page_source().await?.contains(BLOCK_NOTICE) {
        let url = session.current_url().await?;
        error!("Caught by the bot police at {}. Exiting...", url);
        return Err(CrawlError::BotBlockDetected { url });
    }
    Ok(())
}

/// Wait for an element the crawl cannot continue without.
pub async fn wait_for_required<S: BrowserSession>(
    session: &mut S,
    selector: &str,
    wait: Wait,
) -> Result<S::Element, CrawlError> {
    match browser::wait_for_element(session, selector, wait).await? {
        Some(element) => Ok(element),
        None => {
            error!(
                "Could not get the element at {}. There is a connection problem.",
                selector
            );
            Err(CrawlError::presence_timeout(selector, wait.timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_entry_point_is_the_front_page() {
        let base = Url::parse("http://google.com").unwrap();
        assert_eq!(
            entry_point(&base, RenderingMode::Scripted).as_str(),
            "http://google.com/"
        );
    }

    #[test]
    fn non_scripted_entry_point_is_an_empty_search() {
        let base = Url::parse("http://google.com").unwrap();
        assert_eq!(
            entry_point(&base, RenderingMode::NonScripted).as_str(),
            "http://google.com/search?q=%20"
        );
    }

    #[test]
    fn search_urls_encode_the_query() {
        let base = Url::parse("http://google.com").unwrap();
        assert_eq!(
            search_url_for(&base, "Increase search results per page...").as_str(),
            "http://google.com/search?q=Increase%20search%20results%20per%20page..."
        );
    }
}
