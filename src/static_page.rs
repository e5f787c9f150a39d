//! Plain HTTP backend for trackers that render their log server-side.
//!
//! Elements are addressed by their position in the parsed document so they
//! can outlive the (non-`Send`) parse tree; each lookup re-parses the page.

use crate::browser::{collapse_whitespace, NavigableSource, ScopedElement};
use crate::error::WatchError;
use async_trait::async_trait;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Delay between re-fetches while waiting for an element to appear.
const REFETCH_INTERVAL: Duration = Duration::from_secs(5);

pub struct StaticSource {
    client: reqwest::Client,
    url: Option<String>,
    document: Option<Arc<str>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            url: None,
            document: None,
        }
    }

    #[cfg(test)]
    pub fn from_document(html: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: None,
            document: Some(Arc::from(html)),
        }
    }

    async fn fetch(&mut self, url: &str) -> Result<(), WatchError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        debug!("Fetched {} ({} bytes)", url, body.len());
        self.document = Some(Arc::from(body));
        Ok(())
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NavigableSource for StaticSource {
    type Element = StaticElement;

    async fn navigate(&mut self, url: &str) -> Result<(), WatchError> {
        self.url = Some(url.to_string());
        self.fetch(url).await
    }

    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<StaticElement, WatchError> {
        let deadline = Instant::now() + timeout;

        loop {
            let document = self
                .document
                .clone()
                .ok_or_else(|| WatchError::Browser("No page loaded".to_string()))?;

            if let Some(ordinal) = first_match(&document, selector)? {
                return Ok(StaticElement { document, ordinal });
            }

            if Instant::now() >= deadline {
                return Err(WatchError::LookupTimeout {
                    selector: selector.to_string(),
                    waited: timeout,
                });
            }

            sleep(REFETCH_INTERVAL).await;
            if let Some(url) = self.url.clone() {
                self.fetch(&url).await?;
            }
        }
    }
}

/// An element of a fetched document, identified by its node position.
#[derive(Debug, Clone)]
pub struct StaticElement {
    document: Arc<str>,
    ordinal: usize,
}

impl StaticElement {
    fn with_element<T>(&self, f: impl FnOnce(&Html, ElementRef) -> T) -> Result<T, WatchError> {
        let html = Html::parse_document(&self.document);
        let element = html
            .tree
            .root()
            .descendants()
            .nth(self.ordinal)
            .and_then(ElementRef::wrap)
            .ok_or_else(|| WatchError::Browser("Element no longer in document".to_string()))?;
        Ok(f(&html, element))
    }

    fn select_within(&self, selector: &str) -> Result<Vec<StaticElement>, WatchError> {
        let selector = parse_selector(selector)?;
        let ordinals =
            self.with_element(|html, element| ordinals_of(html, element.select(&selector)))?;

        Ok(ordinals
            .into_iter()
            .map(|ordinal| StaticElement {
                document: Arc::clone(&self.document),
                ordinal,
            })
            .collect())
    }

    fn inner_text(&self) -> Result<String, WatchError> {
        self.with_element(|_, element| collapse_whitespace(&element.text().collect::<String>()))
    }
}

#[async_trait]
impl ScopedElement for StaticElement {
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, WatchError> {
        self.select_within(selector)
    }

    async fn text(&self) -> Result<String, WatchError> {
        self.inner_text()
    }
}

fn parse_selector(selector: &str) -> Result<Selector, WatchError> {
    Selector::parse(selector)
        .map_err(|e| WatchError::Browser(format!("Invalid selector '{}': {:?}", selector, e)))
}

fn first_match(document: &str, selector: &str) -> Result<Option<usize>, WatchError> {
    let selector = parse_selector(selector)?;
    let html = Html::parse_document(document);
    let ordinals = ordinals_of(&html, html.select(&selector).take(1));
    Ok(ordinals.into_iter().next())
}

/// Positions of `matched` among all nodes of `html`, in document order.
fn ordinals_of<'a>(html: &Html, matched: impl Iterator<Item = ElementRef<'a>>) -> Vec<usize> {
    let ids: Vec<_> = matched.map(|m| m.id()).collect();
    html.tree
        .root()
        .descendants()
        .enumerate()
        .filter(|(_, node)| ids.contains(&node.id()))
        .map(|(ordinal, _)| ordinal)
        .collect()
}
