use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qa_crawler::browser::{self, BrowserOptions, WebDriverSession};
use qa_crawler::config::{Cli, CrawlSettings};
use qa_crawler::crawler::Crawler;
use qa_crawler::dataset::Dataset;
use qa_crawler::output::FileSink;
use qa_crawler::preferences;

const DEFAULT_RESULTS_PER_PAGE: u32 = 10;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    if let Err(err) = init_tracing(&cli) {
        eprintln!("Failed to initialize logging: {:#}", err);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("Failed to open log file {}", cli.log_file.display()))?;

    // WebDriver client traffic logs every HTTP request; we are not interested in that.
    let default_filter = format!(
        "{},thirtyfour=warn,hyper=warn,reqwest=warn",
        cli.log_level.as_directive()
    );
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or(default_filter),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let dataset = Dataset::load(&cli.jeopardy_json)?;
    let queries: Vec<_> = dataset.queries(cli.first, cli.last).collect();
    let sink = FileSink::create(&cli.output_folder, cli.output_format)?;
    let settings = CrawlSettings::from(&cli);

    let mut session = WebDriverSession::connect(&BrowserOptions::from(&cli)).await?;
    if cli.results_per_page != DEFAULT_RESULTS_PER_PAGE {
        if let Err(err) =
            preferences::set_results_per_page(&mut session, &settings, cli.results_per_page).await
        {
            browser::close_after_failure(session).await;
            return Err(err.into());
        }
    }

    info!("Start. {} questions to crawl.", queries.len());
    let mut crawler = Crawler::new(session, sink, settings);
    let outcome = crawler.crawl_queries(queries).await;
    // The browser goes down whether the batch finished or hit a fatal condition.
    let finished = crawler.finish().await;

    let summary = outcome.context("Crawl aborted")?;
    let sink = finished?;
    info!(
        "End. {} questions crawled, {} saved to {} with {} results in {}s.",
        summary.queries_crawled,
        summary.queries_persisted,
        sink.folder().display(),
        summary.results_collected,
        (summary.finished_at - summary.started_at).num_seconds()
    );
    Ok(())
}
