use std::path::PathBuf;
use std::time::Duration;

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, ValueEnum};
use url::Url;

use crate::browser::{BrowserOptions, DriverType, Wait};
use crate::dom::RenderingMode;
use crate::output::OutputFormat;

/// Crawl search engine results for Jeopardy! questions to build a QA dataset.
#[derive(Debug, Parser)]
#[command(name = "qa-crawler", version, about)]
pub struct Cli {
    /// Path to the Jeopardy! dataset file
    #[arg(short = 'j', long)]
    pub jeopardy_json: PathBuf,

    /// Output files are written here; the folder is created if missing
    #[arg(short = 'o', long)]
    pub output_folder: PathBuf,

    /// The browser behind the WebDriver server
    #[arg(short = 'd', long, value_enum, default_value_t = DriverType::Chrome)]
    pub driver_type: DriverType,

    /// Address of a running WebDriver server
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// First entry from which to start reading questions
    #[arg(short = 'f', long, default_value_t = 0)]
    pub first: usize,

    /// Entry at which to stop reading questions (exclusive)
    #[arg(short = 'l', long, default_value_t = 216_930)]
    pub last: usize,

    /// Number of search result pages to parse per query
    #[arg(short = 'n', long, default_value_t = 1)]
    pub num_pages: usize,

    /// Seconds to wait before getting the next page
    #[arg(short = 'w', long, default_value_t = 4)]
    pub wait_duration: u64,

    /// Level of log messages below which nothing is logged
    #[arg(short = 'g', long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[arg(long, default_value = "jeopardy_crawler.log")]
    pub log_file: PathBuf,

    /// Simulate human typing by pressing keys one by one
    #[arg(long)]
    pub simulate_typing: bool,

    /// Simulate mouse clicking on the next page link
    #[arg(long)]
    pub simulate_clicking: bool,

    /// Disable JavaScript and crawl the non-scripted version of the site
    #[arg(long)]
    pub disable_javascript: bool,

    /// Number of search results in a page per query
    #[arg(long, default_value_t = 10, value_parser = PossibleValuesParser::new(["10", "20", "30", "50", "100"]).map(|s| s.parse::<u32>().unwrap_or(10)))]
    pub results_per_page: u32,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output_format: OutputFormat,

    /// Search engine entry point
    #[arg(long, env = "SEARCH_URL", default_value = "http://google.com")]
    pub search_url: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStrategy {
    /// Clear the box, set the whole query, press Enter.
    WholeString,
    /// Click into the box and type key by key with a human cadence.
    Typed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceStrategy {
    /// Move the pointer to the next-page control and click it.
    Click,
    /// Navigate straight to the next page's URL.
    Navigate,
}

/// Read-only settings shared by every query of a batch.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub page_count_limit: usize,
    pub wait_duration: Duration,
    pub wait_jitter: Duration,
    pub submission: SubmissionStrategy,
    pub advance: AdvanceStrategy,
    pub rendering_mode: RenderingMode,
    pub search_url: Url,
    pub element_timeout: Duration,
    pub staleness_timeout: Duration,
    pub poll_interval: Duration,
    pub keystroke_delay: Duration,
    pub keystroke_jitter: Duration,
    pub hover_pause: Duration,
}

pub const BLOCK_NOTICE: &str = "Our systems have detected unusual traffic";

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            page_count_limit: 1,
            wait_duration: Duration::from_secs(4),
            wait_jitter: Duration::from_secs(1),
            submission: SubmissionStrategy::WholeString,
            advance: AdvanceStrategy::Navigate,
            rendering_mode: RenderingMode::Scripted,
            search_url: Url::parse("http://google.com").expect("static url"),
            element_timeout: Duration::from_secs(10),
            staleness_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(500),
            keystroke_delay: Duration::from_millis(50),
            keystroke_jitter: Duration::from_millis(50),
            hover_pause: Duration::from_millis(200),
        }
    }
}

impl CrawlSettings {
    pub fn element_wait(&self) -> Wait {
        Wait::new(self.element_timeout, self.poll_interval)
    }

    pub fn staleness_wait(&self) -> Wait {
        Wait::new(self.staleness_timeout, self.poll_interval)
    }
}

impl From<&Cli> for CrawlSettings {
    fn from(cli: &Cli) -> Self {
        Self {
            page_count_limit: cli.num_pages,
            wait_duration: Duration::from_secs(cli.wait_duration),
            submission: if cli.simulate_typing {
                SubmissionStrategy::Typed
            } else {
                SubmissionStrategy::WholeString
            },
            advance: if cli.simulate_clicking {
                AdvanceStrategy::Click
            } else {
                AdvanceStrategy::Navigate
            },
            rendering_mode: RenderingMode::from_javascript_disabled(cli.disable_javascript),
            search_url: cli.search_url.clone(),
            ..Self::default()
        }
    }
}

impl From<&Cli> for BrowserOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            driver_type: cli.driver_type,
            webdriver_url: cli.webdriver_url.clone(),
            headless: cli.headless,
            disable_javascript: cli.disable_javascript,
        }
    }
}
