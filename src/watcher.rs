use crate::diff::added_entries;
use crate::log_entry::LogEntry;
use crate::notifier::Notifier;
use crate::render::render;
use crate::tracker::PageReader;
use anyhow::Result;
use chrono::Local;
use log::{error, info};
use std::io::Write;
use std::time::Duration;
use tokio::time::sleep;

/// How many poll cycles [`Watcher::run`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLimit {
    Forever,
    Cycles(u64),
}

/// Polls the tracker, notifies about new entries and renders the log.
pub struct Watcher<R, W> {
    reader: R,
    notifier: Notifier,
    interval: Duration,
    out: W,
    entries: Vec<LogEntry>,
}

impl<R: PageReader, W: Write + Send> Watcher<R, W> {
    pub fn new(reader: R, notifier: Notifier, interval: Duration, out: W) -> Self {
        Self {
            reader,
            notifier,
            interval,
            out,
            entries: Vec::new(),
        }
    }

    pub async fn run(&mut self, limit: RunLimit) -> Result<()> {
        info!("Watching {} every {:?}", self.reader.url(), self.interval);

        let mut completed = 0u64;
        loop {
            if let RunLimit::Cycles(n) = limit {
                if completed >= n {
                    return Ok(());
                }
            }

            if completed > 0 {
                sleep(self.interval).await;
            }

            self.cycle().await?;
            completed += 1;
        }
    }

    /// One poll: read, notify about additions, replace state, render.
    /// Returns the entries considered new.
    pub async fn cycle(&mut self) -> Result<Vec<LogEntry>> {
        let current = self.reader.read_entries().await.inspect_err(|e| {
            error!("Reading tracker page failed: {:#}", e);
        })?;

        let added = added_entries(&self.entries, &current);
        if !added.is_empty() {
            info!("{} new entries", added.len());
            self.notifier.notify(&added).await.inspect_err(|e| {
                error!("Sending notification failed: {:#}", e);
            })?;
        }

        self.entries = current;

        render(
            &mut self.out,
            self.reader.url(),
            &self.entries,
            Local::now(),
            self.interval,
        )
        .inspect_err(|e| error!("Rendering failed: {}", e))?;

        Ok(added)
    }
}
