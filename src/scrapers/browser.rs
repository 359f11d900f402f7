use crate::config::BrowserConfig;
use crate::error::{Result, ScoutError};
use crate::scrapers::traits::PageDriver;
use anyhow::Context;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// A single headless Chrome tab driven over CDP
pub struct ChromePage {
    // Dropping the browser kills the Chrome process.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromePage {
    /// Launch Chrome and open the tab the engine will drive
    pub fn launch(config: &BrowserConfig) -> anyhow::Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .idle_browser_timeout(Duration::from_secs(config.idle_timeout_secs))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// headless_chrome blocks on every CDP round trip, so calls run off the async workers
    async fn with_tab<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await?
            .map_err(|e| ScoutError::Browser(format!("{e:#}")))
    }

    async fn evaluate(&self, expression: String) -> Result<Option<serde_json::Value>> {
        self.with_tab(move |tab| Ok(tab.evaluate(&expression, false)?.value))
            .await
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn navigate(&self, url: &Url) -> Result<()> {
        let target = url.to_string();
        debug!("Navigating tab to {}", target);

        let tab = Arc::clone(&self.tab);
        let nav_target = target.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            tab.navigate_to(&nav_target)?;
            tab.wait_until_navigated()?;
            Ok(())
        })
        .await?
        .map_err(|e| ScoutError::Navigation {
            url: target,
            message: format!("{e:#}"),
        })
    }

    async fn scroll_by(&self, pixels: u32) -> Result<()> {
        self.evaluate(format!("window.scrollBy(0, {pixels})")).await?;
        Ok(())
    }

    async fn document_height(&self) -> Result<u64> {
        let value = self.evaluate("document.body.scrollHeight".to_string()).await?;
        value
            .and_then(|v| v.as_f64())
            .map(|height| height as u64)
            .ok_or_else(|| ScoutError::Browser("document height is not a number".to_string()))
    }

    async fn document_html(&self) -> Result<String> {
        let value = self
            .evaluate("document.documentElement.outerHTML".to_string())
            .await?;
        match value {
            Some(serde_json::Value::String(html)) => Ok(html),
            _ => Err(ScoutError::Browser(
                "could not get HTML from page".to_string(),
            )),
        }
    }

    fn driver_name(&self) -> &'static str {
        "headless-chrome"
    }
}
