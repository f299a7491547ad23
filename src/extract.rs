use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error};

use crate::dom::{PageLayout, RenderingMode};
use crate::models::SearchResult;

/// Markup of one loaded result page and the mode it was rendered in.
#[derive(Debug, Clone)]
pub struct ResultPage {
    pub markup: String,
    pub mode: RenderingMode,
}

impl ResultPage {
    pub fn new(markup: impl Into<String>, mode: RenderingMode) -> Self {
        Self {
            markup: markup.into(),
            mode,
        }
    }
}

/// Compiled selectors for the result-item regions of a [`PageLayout`].
struct ItemSelectors {
    container: Selector,
    title: Selector,
    url_anchor: Selector,
    snippet: Selector,
    related_links: Selector,
    related_link: Selector,
}

impl ItemSelectors {
    fn compile(layout: &PageLayout) -> Result<Self> {
        Ok(Self {
            container: parse_selector(layout.result_container)?,
            title: parse_selector(layout.title)?,
            url_anchor: parse_selector(layout.url_anchor)?,
            snippet: parse_selector(layout.snippet)?,
            related_links: parse_selector(layout.related_links)?,
            related_link: parse_selector(layout.related_link)?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector `{}`: {:?}", css, e))
}

/// Parse every organic result on the page, in rendered order.
///
/// Containers that are not web results (videos, image cards) lack a title or
/// url and are skipped. A page without containers yields an empty vector.
pub fn extract(page: &ResultPage) -> Vec<SearchResult> {
    let layout = PageLayout::for_mode(page.mode);
    let selectors = match ItemSelectors::compile(layout) {
        Ok(selectors) => selectors,
        Err(err) => {
            error!("Cannot extract results for {:?}: {}", page.mode, err);
            return Vec::new();
        }
    };

    let document = Html::parse_document(&page.markup);
    document
        .select(&selectors.container)
        .enumerate()
        .filter_map(|(no, container)| {
            let parsed = parse_item(container, &selectors);
            if parsed.is_none() {
                debug!(
                    "Search result no {} is not parsable. It can be a non-website result such as a video.",
                    no
                );
            }
            parsed
        })
        .collect()
}

fn parse_item(container: ElementRef<'_>, selectors: &ItemSelectors) -> Option<SearchResult> {
    let title_region = container.select(&selectors.title).next()?;
    let title = element_text(title_region);
    debug!("parsing result {}", title);

    let url = title_region
        .select(&selectors.url_anchor)
        .next()?
        .value()
        .attr("href")?
        .to_string();

    let snippet = container.select(&selectors.snippet).next().map(element_text);

    let related_links = container
        .select(&selectors.related_links)
        .next()
        .map(|links| links.select(&selectors.related_link).map(element_text).collect());

    Some(SearchResult {
        title,
        url,
        snippet,
        related_links,
    })
}

/// All text under the element with whitespace runs collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
