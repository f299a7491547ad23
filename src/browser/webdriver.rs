use anyhow::{Context, Result};
use async_trait::async_trait;
use thirtyfour::{
    By, Capabilities, DesiredCapabilities, WebDriver, WebElement,
};
use thirtyfour::common::capabilities::firefox::FirefoxPreferences;
use tracing::info;

use super::BrowserSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DriverType {
    Chrome,
    Firefox,
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub driver_type: DriverType,
    /// Address of a running WebDriver server (chromedriver, geckodriver).
    pub webdriver_url: String,
    pub headless: bool,
    pub disable_javascript: bool,
}

/// [`BrowserSession`] backed by a `thirtyfour` WebDriver client.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    pub async fn connect(options: &BrowserOptions) -> Result<Self> {
        info!(
            "Connecting to {:?} WebDriver at {}",
            options.driver_type, options.webdriver_url
        );
        let caps = capabilities(options)?;
        let driver = WebDriver::new(&options.webdriver_url, caps)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to WebDriver at {}. Is the driver running?",
                    options.webdriver_url
                )
            })?;

        Ok(Self { driver })
    }
}

/// Session capabilities for the configured browser.
pub fn capabilities(options: &BrowserOptions) -> Result<Capabilities> {
    match options.driver_type {
        DriverType::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            caps.add_chrome_arg("--no-sandbox")?;
            caps.add_chrome_arg("--disable-dev-shm-usage")?;
            if options.headless {
                caps.add_chrome_arg("--headless")?;
                caps.add_chrome_arg("--disable-gpu")?;
            }
            if options.disable_javascript {
                info!("Disabling JavaScript...");
                caps.add_chrome_arg("--blink-settings=scriptEnabled=false")?;
            }
            Ok(caps.into())
        }
        DriverType::Firefox => {
            let mut caps = DesiredCapabilities::firefox();
            if options.headless {
                caps.set_headless()?;
            }
            if options.disable_javascript {
                info!("Disabling JavaScript...");
                let mut prefs = FirefoxPreferences::new();
                prefs.set("javascript.enabled", false)?;
                caps.set_preferences(prefs)?;
            }
            Ok(caps.into())
        }
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Element = WebElement;

    async fn goto(&mut self, url: &str) -> Result<()> {
        self.driver
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to URL: {}", url))
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.driver.source().await.context("Failed to get page source")
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<WebElement>> {
        Ok(self.driver.find_all(By::Css(selector)).await?)
    }

    async fn text(&mut self, element: &WebElement) -> Result<String> {
        Ok(element.text().await?)
    }

    async fn attribute(&mut self, element: &WebElement, name: &str) -> Result<Option<String>> {
        Ok(element.attr(name).await?)
    }

    async fn hover(&mut self, element: &WebElement) -> Result<()> {
        self.driver
            .action_chain()
            .move_to_element_center(element)
            .perform()
            .await?;
        Ok(())
    }

    async fn click(&mut self, element: &WebElement) -> Result<()> {
        Ok(element.click().await?)
    }

    async fn clear(&mut self, element: &WebElement) -> Result<()> {
        Ok(element.clear().await?)
    }

    async fn send_keys(&mut self, element: &WebElement, text: &str) -> Result<()> {
        Ok(element.send_keys(text).await?)
    }

    async fn is_stale(&mut self, element: &WebElement) -> Result<bool> {
        Ok(!element.is_present().await?)
    }

    async fn quit(self) -> Result<()>
    where
        Self: Sized,
    {
        self.driver.quit().await?;
        Ok(())
    }
}
