//! Capabilities the tracker page reader needs from a browser.
//!
//! A [`NavigableSource`] loads pages and locates top-level elements; the
//! elements it hands out implement [`ScopedElement`] for lookups confined to
//! their own subtree.

use crate::error::WatchError;
use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Delay between lookups while waiting for an element to appear.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[async_trait]
pub trait NavigableSource: Send {
    type Element: ScopedElement;

    /// Load `url`, replacing whatever was shown before.
    async fn navigate(&mut self, url: &str) -> Result<(), WatchError>;

    /// Wait up to `timeout` for the first element matching `selector`.
    async fn wait_for_element(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, WatchError>;
}

#[async_trait]
pub trait ScopedElement: Send + Sync + Sized {
    /// All descendants matching `selector`, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self>, WatchError>;

    /// Visible text with whitespace collapsed.
    async fn text(&self) -> Result<String, WatchError>;

    /// Poll [`find_all`](Self::find_all) until it returns something or
    /// `timeout` elapses.
    async fn wait_for_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Self>, WatchError> {
        let deadline = Instant::now() + timeout;

        loop {
            let found = self.find_all(selector).await?;
            if !found.is_empty() {
                return Ok(found);
            }

            if Instant::now() >= deadline {
                return Err(WatchError::LookupTimeout {
                    selector: selector.to_string(),
                    waited: timeout,
                });
            }

            debug!("No '{}' yet, retrying in {:?}", selector, POLL_INTERVAL);
            sleep(POLL_INTERVAL).await;
        }
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Element whose children only show up after a number of lookups.
    struct SlowElement {
        calls: Arc<AtomicUsize>,
        ready_after: usize,
    }

    #[async_trait]
    impl ScopedElement for SlowElement {
        async fn find_all(&self, _selector: &str) -> Result<Vec<Self>, WatchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.ready_after {
                Ok(vec![SlowElement {
                    calls: Arc::new(AtomicUsize::new(0)),
                    ready_after: 0,
                }])
            } else {
                Ok(Vec::new())
            }
        }

        async fn text(&self) -> Result<String, WatchError> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn wait_for_all_retries_until_found() {
        let calls = Arc::new(AtomicUsize::new(0));
        let el = SlowElement {
            calls: Arc::clone(&calls),
            ready_after: 2,
        };

        let found = el.wait_for_all("tr", Duration::from_secs(5)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn wait_for_all_times_out() {
        let el = SlowElement {
            calls: Arc::new(AtomicUsize::new(0)),
            ready_after: usize::MAX,
        };

        let err = el.wait_for_all("tr", Duration::ZERO).await.err().unwrap();
        assert!(matches!(err, WatchError::LookupTimeout { ref selector, .. } if selector == "tr"));
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(collapse_whitespace("  En \n  ruta\t"), "En ruta");
    }
}
