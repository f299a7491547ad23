//! CSS locators for the regions of a search result page.
//!
//! The search engine serves materially different markup depending on whether
//! client-side scripting is active, so every locator is resolved from a
//! [`RenderingMode`]. Class names follow the engine's own help terminology
//! ("title", "snippet", "related links").

/// Whether the result page was rendered with scripting enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderingMode {
    Scripted,
    NonScripted,
}

impl RenderingMode {
    pub fn from_javascript_disabled(disabled: bool) -> Self {
        if disabled {
            RenderingMode::NonScripted
        } else {
            RenderingMode::Scripted
        }
    }
}

/// How the next-page control is found on a result page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPageLocator {
    /// A single control carrying a fixed id.
    Control(&'static str),
    /// The last element matching the selector, accepted only when its label is
    /// exactly the given text.
    LastLabelled {
        selector: &'static str,
        label: &'static str,
    },
}

/// Locator set for one rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub mode: RenderingMode,
    pub result_container: &'static str,
    pub title: &'static str,
    /// Anchor nested inside the title region.
    pub url_anchor: &'static str,
    pub snippet: &'static str,
    pub related_links: &'static str,
    pub related_link: &'static str,
    pub next_page: NextPageLocator,
    pub search_box: &'static str,
}

const RESULT_TITLE: &str = ".r";
const RESULT_URL_ANCHOR: &str = "a";
const RESULT_SNIPPET: &str = ".st";
const RESULT_RELATED_LINKS: &str = ".osl";
const RESULT_RELATED_LINK: &str = ".fl";

static SCRIPTED: PageLayout = PageLayout {
    mode: RenderingMode::Scripted,
    result_container: ".rc",
    title: RESULT_TITLE,
    url_anchor: RESULT_URL_ANCHOR,
    snippet: RESULT_SNIPPET,
    related_links: RESULT_RELATED_LINKS,
    related_link: RESULT_RELATED_LINK,
    next_page: NextPageLocator::Control("#pnnext"),
    search_box: "#lst-ib",
};

// Without scripting the next-page link has no id; it is the last of the
// navigation links.
static NON_SCRIPTED: PageLayout = PageLayout {
    mode: RenderingMode::NonScripted,
    result_container: ".g",
    title: RESULT_TITLE,
    url_anchor: RESULT_URL_ANCHOR,
    snippet: RESULT_SNIPPET,
    related_links: RESULT_RELATED_LINKS,
    related_link: RESULT_RELATED_LINK,
    next_page: NextPageLocator::LastLabelled {
        selector: ".fl",
        label: "Next",
    },
    search_box: "#sbhost",
};

impl PageLayout {
    pub fn for_mode(mode: RenderingMode) -> &'static PageLayout {
        match mode {
            RenderingMode::Scripted => &SCRIPTED,
            RenderingMode::NonScripted => &NON_SCRIPTED,
        }
    }
}

/// Locators of the search preferences page, which only exists in the
/// non-scripted version of the site.
pub mod preferences {
    pub const RESULTS_PER_PAGE_SELECT: &str = "#numsel";
    pub const SAVE_BUTTON: &str = "[name=\"submit2\"]";

    pub fn results_per_page_option(value: u32) -> String {
        format!("{RESULTS_PER_PAGE_SELECT} option[value=\"{value}\"]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn selectors(layout: &PageLayout) -> Vec<&'static str> {
        let next = match layout.next_page {
            NextPageLocator::Control(sel) => sel,
            NextPageLocator::LastLabelled { selector, .. } => selector,
        };
        vec![
            layout.result_container,
            layout.title,
            layout.url_anchor,
            layout.snippet,
            layout.related_links,
            layout.related_link,
            layout.search_box,
            next,
        ]
    }

    #[test]
    fn every_locator_is_valid_css() {
        for mode in [RenderingMode::Scripted, RenderingMode::NonScripted] {
            for css in selectors(PageLayout::for_mode(mode)) {
                assert!(Selector::parse(css).is_ok(), "{css} in {mode:?}");
            }
        }
        assert!(Selector::parse(preferences::SAVE_BUTTON).is_ok());
        assert!(Selector::parse(&preferences::results_per_page_option(20)).is_ok());
    }

    #[test]
    fn layouts_differ_where_markup_differs() {
        let scripted = PageLayout::for_mode(RenderingMode::Scripted);
        let plain = PageLayout::for_mode(RenderingMode::NonScripted);

        assert_eq!(scripted.mode, RenderingMode::Scripted);
        assert_eq!(plain.mode, RenderingMode::NonScripted);
        assert_ne!(scripted.result_container, plain.result_container);
        assert_ne!(scripted.search_box, plain.search_box);
        assert_eq!(scripted.title, plain.title);
        assert_eq!(scripted.next_page, NextPageLocator::Control("#pnnext"));
    }

    #[test]
    fn javascript_flag_selects_mode() {
        assert_eq!(
            RenderingMode::from_javascript_disabled(true),
            RenderingMode::NonScripted
        );
        assert_eq!(
            RenderingMode::from_javascript_disabled(false),
            RenderingMode::Scripted
        );
    }
}
