//! Chromium backend driven over the DevTools protocol.

use crate::browser::{collapse_whitespace, NavigableSource, ScopedElement, POLL_INTERVAL};
use crate::error::WatchError;
use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use log::{debug, info};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

pub struct ChromiumSource {
    // Dropping the browser closes the connection and kills the process.
    _browser: Browser,
    page: Page,
    handler_handle: JoinHandle<()>,
}

impl ChromiumSource {
    pub async fn launch(headless: bool) -> Result<Self, WatchError> {
        let mut builder = BrowserConfig::builder();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| WatchError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // Events must be drained for the browser to make progress
        let handler_handle = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let page = browser.new_page("about:blank").await?;
        info!("Chromium started (headless: {})", headless);

        Ok(Self {
            _browser: browser,
            page,
            handler_handle,
        })
    }
}

impl Drop for ChromiumSource {
    fn drop(&mut self) {
        self.handler_handle.abort();
    }
}

#[async_trait]
impl NavigableSource for ChromiumSource {
    type Element = ChromiumElement;

    async fn navigate(&mut self, url: &str) -> Result<(), WatchError> {
        debug!("Navigating to {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ChromiumElement, WatchError> {
        let deadline = Instant::now() + timeout;

        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(ChromiumElement(element)),
                Err(e) if is_missing_node(&e) => {}
                Err(e) => return Err(e.into()),
            }

            if Instant::now() >= deadline {
                return Err(WatchError::LookupTimeout {
                    selector: selector.to_string(),
                    waited: timeout,
                });
            }

            sleep(POLL_INTERVAL).await;
        }
    }
}

/// Errors the browser reports while the selector has no match yet.
///
/// Protocol error replies (e.g. "Could not find node with given id") mean
/// the browser is alive and answered; transport failures are not retried.
fn is_missing_node(e: &CdpError) -> bool {
    matches!(e, CdpError::NotFound | CdpError::Chrome(_))
}

pub struct ChromiumElement(Element);

#[async_trait]
impl ScopedElement for ChromiumElement {
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, WatchError> {
        let elements = self.0.find_elements(selector).await?;
        Ok(elements.into_iter().map(ChromiumElement).collect())
    }

    async fn text(&self) -> Result<String, WatchError> {
        let text = self.0.inner_text().await?.unwrap_or_default();
        Ok(collapse_whitespace(&text))
    }
}
