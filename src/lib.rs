//! Crawl search engine result pages for a list of questions.
//!
//! A [`crawler::Crawler`] feeds queries one at a time to a
//! [`session::QuerySession`], which submits the query into the search box and
//! hands over to a [`pagination::Paginator`]. Each loaded page is parsed by
//! [`extract::extract`] using the locators of [`dom::PageLayout`].

pub mod browser;
pub mod config;
pub mod crawler;
pub mod dataset;
pub mod dom;
pub mod error;
pub mod extract;
pub mod models;
pub mod output;
pub mod pacing;
pub mod pagination;
pub mod preferences;
pub mod session;

pub use error::CrawlError;
pub use models::{Query, SearchResult};
