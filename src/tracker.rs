use crate::browser::{NavigableSource, ScopedElement};
use crate::config::TrackerConfig;
use crate::log_entry::LogEntry;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

/// Something that produces the current tracking history.
#[async_trait]
pub trait PageReader: Send {
    /// URL shown to the user and included in notifications.
    fn url(&self) -> &str;

    async fn read_entries(&mut self) -> Result<Vec<LogEntry>>;
}

/// Reads the log table of the tracker page through a browser source.
pub struct TrackerPage<S> {
    source: S,
    url: String,
    config: TrackerConfig,
}

impl<S: NavigableSource> TrackerPage<S> {
    pub fn new(source: S, code: &str, config: TrackerConfig) -> Self {
        Self {
            url: config.url_for(code),
            source,
            config,
        }
    }
}

#[async_trait]
impl<S: NavigableSource> PageReader for TrackerPage<S> {
    fn url(&self) -> &str {
        &self.url
    }

    async fn read_entries(&mut self) -> Result<Vec<LogEntry>> {
        let timeout = self.config.lookup_timeout();

        self.source
            .navigate(&self.url)
            .await
            .with_context(|| format!("Failed to load {}", self.url))?;

        let container = self
            .source
            .wait_for_element(&self.config.container_selector, timeout)
            .await
            .context("Tracker log container did not appear")?;

        let rows = container
            .wait_for_all(&self.config.row_selector, timeout)
            .await
            .context("Tracker log has no rows")?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let cells = row.find_all(&self.config.cell_selector).await?;

            let mut texts = Vec::with_capacity(cells.len());
            for cell in &cells {
                texts.push(cell.text().await?);
            }

            if let Some(entry) = LogEntry::from_cells(&texts) {
                entries.push(entry);
            }
        }

        debug!("Read {} entries from {} rows", entries.len(), rows.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatchError;
    use std::time::Duration;

    /// In-memory page: `None` means the container never renders.
    struct FakeSource {
        rows: Option<Vec<Vec<&'static str>>>,
        visited: Vec<String>,
    }

    #[derive(Clone)]
    enum FakeElement {
        Container(Vec<Vec<&'static str>>),
        Row(Vec<&'static str>),
        Cell(&'static str),
    }

    #[async_trait]
    impl NavigableSource for FakeSource {
        type Element = FakeElement;

        async fn navigate(&mut self, url: &str) -> Result<(), WatchError> {
            self.visited.push(url.to_string());
            Ok(())
        }

        async fn wait_for_element(
            &mut self,
            selector: &str,
            timeout: Duration,
        ) -> Result<FakeElement, WatchError> {
            match &self.rows {
                Some(rows) if selector == "#logs" => Ok(FakeElement::Container(rows.clone())),
                _ => Err(WatchError::LookupTimeout {
                    selector: selector.to_string(),
                    waited: timeout,
                }),
            }
        }
    }

    #[async_trait]
    impl ScopedElement for FakeElement {
        async fn find_all(&self, selector: &str) -> Result<Vec<Self>, WatchError> {
            Ok(match (self, selector) {
                (FakeElement::Container(rows), "tr") => {
                    rows.iter().cloned().map(FakeElement::Row).collect()
                }
                (FakeElement::Row(cells), "td") => {
                    cells.iter().copied().map(FakeElement::Cell).collect()
                }
                _ => Vec::new(),
            })
        }

        async fn text(&self) -> Result<String, WatchError> {
            match self {
                FakeElement::Cell(text) => Ok(text.to_string()),
                _ => Ok(String::new()),
            }
        }
    }

    #[tokio::test]
    async fn reads_rows_in_page_order_and_skips_headers() {
        let source = FakeSource {
            rows: Some(vec![
                vec![],
                vec!["2024-03-02", "14:30", "Callao", "In transit"],
                vec!["2024-03-01", "09:00", "Lima", "Registered"],
            ]),
            visited: Vec::new(),
        };
        let mut page = TrackerPage::new(source, "ABC", TrackerConfig::default());

        let entries = page.read_entries().await.unwrap();

        assert_eq!(page.source.visited, vec!["https://apps.chazki.com/tracker/ABC"]);
        assert_eq!(
            entries,
            vec![
                LogEntry::new("2024-03-02 14:30".into(), "Callao".into(), "In transit".into()),
                LogEntry::new("2024-03-01 09:00".into(), "Lima".into(), "Registered".into()),
            ]
        );
    }

    #[tokio::test]
    async fn missing_container_is_a_lookup_timeout() {
        let source = FakeSource {
            rows: None,
            visited: Vec::new(),
        };
        let mut page = TrackerPage::new(source, "ABC", TrackerConfig::default());

        let err = page.read_entries().await.unwrap_err();
        let cause = err.downcast_ref::<WatchError>().unwrap();
        assert!(matches!(cause, WatchError::LookupTimeout { .. }));
    }

    #[test]
    fn url_uses_tracking_code() {
        let source = FakeSource {
            rows: None,
            visited: Vec::new(),
        };
        let page = TrackerPage::new(source, "XYZ9", TrackerConfig::default());
        assert_eq!(page.url(), "https://apps.chazki.com/tracker/XYZ9");
    }
}
