use std::time::Duration;

use thiserror::Error;

/// Conditions that end the whole crawl.
///
/// Per-item and per-page outcomes (unparsable result, empty page, no next
/// page) are not errors; they surface as [`crate::pagination::StopReason`].
#[derive(Debug, Error)]
pub enum CrawlError {
    /// An element the crawl cannot proceed without never appeared (or never
    /// went stale). Locally this looks the same as the site or the network
    /// being down.
    #[error("timed out after {timeout:?} waiting for {condition} `{selector}`")]
    PageLoadTimeout {
        selector: String,
        condition: WaitCondition,
        timeout: Duration,
    },

    #[error("caught by the bot police at {url}: the search engine reports unusual traffic")]
    BotBlockDetected { url: String },

    #[error("browser session failed")]
    Browser(#[from] anyhow::Error),

    #[error("could not persist results of query {id}")]
    Persist {
        id: usize,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    Presence,
    Staleness,
}

impl std::fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitCondition::Presence => f.write_str("presence of"),
            WaitCondition::Staleness => f.write_str("staleness of"),
        }
    }
}

impl CrawlError {
    pub fn presence_timeout(selector: &str, timeout: Duration) -> Self {
        CrawlError::PageLoadTimeout {
            selector: selector.to_string(),
            condition: WaitCondition::Presence,
            timeout,
        }
    }

    pub fn staleness_timeout(selector: &str, timeout: Duration) -> Self {
        CrawlError::PageLoadTimeout {
            selector: selector.to_string(),
            condition: WaitCondition::Staleness,
            timeout,
        }
    }
}
