//! Walks consecutive result pages of one query: wait for results, extract,
//! decide whether to continue, advance.

use tracing::{debug, warn};
use url::Url;

use crate::browser::{self, BrowserSession};
use crate::config::{AdvanceStrategy, CrawlSettings};
use crate::dom::{NextPageLocator, PageLayout};
use crate::error::CrawlError;
use crate::extract::{extract, ResultPage};
use crate::models::SearchResult;
use crate::pacing;
use crate::session::ensure_not_blocked;

/// Why a query's pagination ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No result container appeared in time. Either the query has no results
    /// or the engine stopped serving them to us.
    ResultsNeverAppeared,
    /// Containers were present but none held a web result.
    EmptyPage,
    NoNextPage,
    PageLimit,
}

/// A resolved next-page control and, when it has one, its target URL.
#[derive(Debug, Clone)]
pub struct NextPage<E> {
    pub control: E,
    pub target: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaginationState<E> {
    pub pages_consulted: usize,
    pub next_page: Option<NextPage<E>>,
    pub exhausted: bool,
}

impl<E> Default for PaginationState<E> {
    fn default() -> Self {
        Self {
            pages_consulted: 0,
            next_page: None,
            exhausted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Ready,
    PageLoaded,
    Extracted,
    Advancing,
    Exhausted(StopReason),
}

/// Everything collected for one query.
#[derive(Debug, Clone)]
pub struct PaginationOutcome {
    pub results: Vec<SearchResult>,
    pub pages_consulted: usize,
    pub stop: StopReason,
}

pub struct Paginator<'a, S: BrowserSession> {
    session: &'a mut S,
    settings: &'a CrawlSettings,
    layout: &'static PageLayout,
}

impl<'a, S: BrowserSession> Paginator<'a, S> {
    pub fn new(session: &'a mut S, settings: &'a CrawlSettings) -> Self {
        Self {
            session,
            settings,
            layout: PageLayout::for_mode(settings.rendering_mode),
        }
    }

    /// Consume result pages starting from the one currently loaded.
    pub async fn run(mut self) -> Result<PaginationOutcome, CrawlError> {
        let limit = self.settings.page_count_limit;
        let mut state = PaginationState::<S::Element>::default();
        let mut results = Vec::new();
        let mut phase = if limit == 0 {
            Phase::Exhausted(StopReason::PageLimit)
        } else {
            Phase::Ready
        };
        let mut stop = StopReason::PageLimit;

        while !state.exhausted {
            phase = match phase {
                Phase::Ready => {
                    debug!("Parsing page {}.", state.pages_consulted);
                    if self.wait_for_results().await? {
                        Phase::PageLoaded
                    } else {
                        warn!(
                            "Timed out waiting for results: either there are no search results \
                             or the search engine realized that we are a bot \
                             or there is a connection problem (less likely)."
                        );
                        Phase::Exhausted(StopReason::ResultsNeverAppeared)
                    }
                }
                Phase::PageLoaded => {
                    let page = ResultPage::new(self.session.page_source().await?, self.layout.mode);
                    let page_results = extract(&page);
                    state.pages_consulted += 1;
                    debug!("Collected {} search results.", page_results.len());
                    if page_results.is_empty() {
                        Phase::Exhausted(StopReason::EmptyPage)
                    } else {
                        results.extend(page_results);
                        Phase::Extracted
                    }
                }
                Phase::Extracted => {
                    state.next_page = self.resolve_next_page().await?;
                    match state.next_page {
                        None => {
                            debug!("There is no next page.");
                            Phase::Exhausted(StopReason::NoNextPage)
                        }
                        Some(_) if state.pages_consulted >= limit => {
                            Phase::Exhausted(StopReason::PageLimit)
                        }
                        Some(_) => Phase::Advancing,
                    }
                }
                Phase::Advancing => {
                    pacing::wait_with_jitter(self.settings.wait_duration, self.settings.wait_jitter)
                        .await;
                    let advanced = match state.next_page.take() {
                        Some(next) => self.advance(next).await?,
                        None => false,
                    };
                    if advanced {
                        ensure_not_blocked(&mut *self.session).await?;
                        Phase::Ready
                    } else {
                        Phase::Exhausted(StopReason::NoNextPage)
                    }
                }
                Phase::Exhausted(reason) => {
                    stop = reason;
                    state.exhausted = true;
                    phase
                }
            };
        }

        Ok(PaginationOutcome {
            results,
            pages_consulted: state.pages_consulted,
            stop,
        })
    }

    async fn wait_for_results(&mut self) -> Result<bool, CrawlError> {
        let wait = self.settings.element_wait();
        let found =
            browser::wait_for_element(&mut *self.session, self.layout.result_container, wait).await?;
        Ok(found.is_some())
    }

    async fn resolve_next_page(&mut self) -> Result<Option<NextPage<S::Element>>, CrawlError> {
        let control = match self.layout.next_page {
            NextPageLocator::Control(selector) => {
                self.session.find_all(selector).await?.into_iter().next()
            }
            NextPageLocator::LastLabelled { selector, label } => {
                match self.session.find_all(selector).await?.pop() {
                    Some(last) => {
                        let text = self.session.text(&last).await?;
                        (text.trim() == label).then_some(last)
                    }
                    None => None,
                }
            }
        };
        let Some(control) = control else {
            return Ok(None);
        };
        let target = self.session.attribute(&control, "href").await?;
        Ok(Some(NextPage { control, target }))
    }

    /// Request the next page. `false` when there is nothing to navigate to.
    async fn advance(&mut self, next: NextPage<S::Element>) -> Result<bool, CrawlError> {
        match self.settings.advance {
            AdvanceStrategy::Click => {
                let previous = self.session.find_all(self.layout.result_container).await?;
                self.session.hover(&next.control).await?;
                pacing::wait_with_jitter(self.settings.hover_pause, self.settings.hover_pause).await;
                self.session.click(&next.control).await?;
                // Clicks return before the navigation they trigger; the old
                // results going stale is the signal that it happened.
                if let Some(first) = previous.first() {
                    self.wait_until_stale(first).await?;
                }
                Ok(true)
            }
            AdvanceStrategy::Navigate => {
                let Some(target) = next.target else {
                    return Ok(false);
                };
                let url = self.absolute(&target).await?;
                self.session.goto(&url).await?;
                Ok(true)
            }
        }
    }

    async fn wait_until_stale(&mut self, element: &S::Element) -> Result<(), CrawlError> {
        debug!("wait for staleness after clicking next page");
        let wait = self.settings.staleness_wait();
        if browser::wait_for_staleness(&mut *self.session, element, wait).await? {
            debug!("staleness ended");
            Ok(())
        } else {
            Err(CrawlError::staleness_timeout(
                self.layout.result_container,
                wait.timeout,
            ))
        }
    }

    /// Resolve a possibly relative link target against the current page.
    async fn absolute(&mut self, target: &str) -> Result<String, CrawlError> {
        let current = self.session.current_url().await?;
        let joined = Url::parse(&current)
            .and_then(|base| base.join(target))
            .map_err(|e| anyhow::anyhow!("cannot resolve next page link {target:?}: {e}"))?;
        Ok(joined.to_string())
    }
}
