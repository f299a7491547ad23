use chrono::{DateTime, Local};
use tracing::info;

use crate::browser::BrowserSession;
use crate::config::CrawlSettings;
use crate::error::CrawlError;
use crate::models::Query;
use crate::output::ResultSink;
use crate::session::QuerySession;

/// Totals of a finished batch.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub queries_crawled: usize,
    pub queries_persisted: usize,
    pub results_collected: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

/// Runs queries one after another through a single browser session.
pub struct Crawler<S: BrowserSession, K: ResultSink> {
    session: S,
    sink: K,
    settings: CrawlSettings,
}

impl<S: BrowserSession, K: ResultSink> Crawler<S, K> {
    pub fn new(session: S, sink: K, settings: CrawlSettings) -> Self {
        Self {
            session,
            sink,
            settings,
        }
    }

    /// Crawl every query in order and persist the non-empty ones.
    ///
    /// The first fatal error stops the batch; queries after it are not
    /// attempted.
    pub async fn crawl_queries<I>(&mut self, queries: I) -> Result<CrawlSummary, CrawlError>
    where
        I: IntoIterator<Item = Query>,
    {
        let started_at = Local::now();
        let mut queries_crawled = 0;
        let mut queries_persisted = 0;
        let mut results_collected = 0;

        for query in queries {
            info!("Question no {:06}: {}. Crawl!", query.id, query.text);
            let outcome = QuerySession::new(&mut self.session, &self.settings)
                .run(&query)
                .await?;
            queries_crawled += 1;
            info!(
                "Question no {:06}. Collected {} search results from {} pages ({:?}).",
                query.id,
                outcome.results.len(),
                outcome.pages_consulted,
                outcome.stop
            );

            if outcome.results.is_empty() {
                info!("Question no {:06}. Nothing to save.", query.id);
                continue;
            }
            self.sink
                .persist(&query, &outcome.results)
                .map_err(|source| CrawlError::Persist {
                    id: query.id,
                    source,
                })?;
            queries_persisted += 1;
            results_collected += outcome.results.len();
        }

        Ok(CrawlSummary {
            queries_crawled,
            queries_persisted,
            results_collected,
            started_at,
            finished_at: Local::now(),
        })
    }

    /// Take back the browser session and the sink without closing anything.
    pub fn into_parts(self) -> (S, K) {
        (self.session, self.sink)
    }

    /// Close the browser, returning the sink.
    pub async fn finish(self) -> anyhow::Result<K> {
        let (session, sink) = self.into_parts();
        session.quit().await?;
        Ok(sink)
    }
}
