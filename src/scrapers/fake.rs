//! Scripted in-memory page for engine tests

use crate::error::{Result, ScoutError};
use crate::scrapers::traits::PageDriver;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Debug, Default)]
struct FakeState {
    html: String,
    height: u64,
    /// Added to `height` on every scroll, to simulate lazy loading
    growth_per_scroll: u64,
    scrolled_px: u64,
    scrolls: u32,
    navigations: Vec<String>,
    fail_navigation: bool,
    navigation_delay: Option<Duration>,
    fail_html: bool,
}

/// Clones share state, so a test can keep one while the engine owns another
#[derive(Debug, Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    pub fn new(html: &str, height: u64) -> Self {
        let page = Self::default();
        page.set_html(html);
        page.set_height(height);
        page
    }

    fn with<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_html(&self, html: &str) {
        self.with(|s| s.html = html.to_string());
    }

    pub fn set_height(&self, height: u64) {
        self.with(|s| s.height = height);
    }

    pub fn grow_on_scroll(&self, pixels: u64) {
        self.with(|s| s.growth_per_scroll = pixels);
    }

    pub fn fail_navigation(&self) {
        self.with(|s| s.fail_navigation = true);
    }

    /// Make every navigation take `delay` before it reports back
    pub fn delay_navigation(&self, delay: Duration) {
        self.with(|s| s.navigation_delay = Some(delay));
    }

    pub fn fail_html(&self, fail: bool) {
        self.with(|s| s.fail_html = fail);
    }

    pub fn scrolls(&self) -> u32 {
        self.with(|s| s.scrolls)
    }

    pub fn scrolled_px(&self) -> u64 {
        self.with(|s| s.scrolled_px)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.with(|s| s.navigations.clone())
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn navigate(&self, url: &Url) -> Result<()> {
        let delay = self.with(|s| {
            s.navigations.push(url.to_string());
            s.navigation_delay
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.with(|s| {
            if s.fail_navigation {
                Err(ScoutError::Navigation {
                    url: url.to_string(),
                    message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
                })
            } else {
                Ok(())
            }
        })
    }

    async fn scroll_by(&self, pixels: u32) -> Result<()> {
        self.with(|s| {
            s.scrolls += 1;
            s.scrolled_px += u64::from(pixels);
            s.height += s.growth_per_scroll;
        });
        Ok(())
    }

    async fn document_height(&self) -> Result<u64> {
        Ok(self.with(|s| s.height))
    }

    async fn document_html(&self) -> Result<String> {
        self.with(|s| {
            if s.fail_html {
                Err(ScoutError::Browser("target closed".to_string()))
            } else {
                Ok(s.html.clone())
            }
        })
    }

    fn driver_name(&self) -> &'static str {
        "fake"
    }
}
