use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::browser::BrowserSession;
use crate::config::CrawlSettings;
use crate::dom::{preferences, PageLayout, RenderingMode};
use crate::error::CrawlError;
use crate::session::{search_url_for, wait_for_required};

const SETTLE: Duration = Duration::from_secs(1);

/// Change the search engine's "results per page" preference for this browser.
///
/// Visiting the preferences page directly yields a "cookies seem to be
/// disabled" warning, so a dummy query is made first, which also redirects
/// to the non-scripted site where the preferences form lives.
pub async fn set_results_per_page<S: BrowserSession>(
    session: &mut S,
    settings: &CrawlSettings,
    results_per_page: u32,
) -> Result<(), CrawlError> {
    debug!("Setting search results per page to {}...", results_per_page);
    let dummy = search_url_for(&settings.search_url, "Increase search results per page...");
    session.goto(dummy.as_str()).await?;
    let search_box = PageLayout::for_mode(RenderingMode::NonScripted).search_box;
    wait_for_required(session, search_box, settings.element_wait()).await?;

    let mut url = settings.search_url.clone();
    url.set_path("/preferences");
    url.set_query(Some("hl=en"));
    session.goto(url.as_str()).await?;

    wait_for_required(
        session,
        preferences::RESULTS_PER_PAGE_SELECT,
        settings.element_wait(),
    )
    .await?;
    sleep(SETTLE).await;
    let option = wait_for_required(
        session,
        &preferences::results_per_page_option(results_per_page),
        settings.element_wait(),
    )
    .await?;
    session.click(&option).await?;
    info!("Selected value: {}", session.text(&option).await?.trim());
    sleep(SETTLE).await;

    let save = wait_for_required(session, preferences::SAVE_BUTTON, settings.element_wait()).await?;
    session.click(&save).await?;
    sleep(SETTLE).await;
    Ok(())
}
