mod browser;
mod chromium;
mod config;
mod diff;
mod error;
mod log_entry;
mod messenger;
mod notifier;
mod render;
mod static_page;
mod tracker;
mod watcher;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::io;

use crate::config::{Backend, Config};
use crate::messenger::WhatsAppMessenger;
use crate::notifier::Notifier;
use crate::tracker::{PageReader, TrackerPage};
use crate::watcher::{RunLimit, Watcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = config::Cli::parse();

    // Load configuration
    let config = config::load_config(&cli)?;

    init_logging(&config)?;
    info!("Starting parcel-watch for {}", cli.code);

    match config.browser {
        Backend::Chromium => {
            if config.headless {
                println!("WARNING: Headless mode on Chromium might break. Turn off with -H parameter.");
            }
            let source = chromium::ChromiumSource::launch(config.headless)
                .await
                .context("Failed to start Chromium")?;
            watch(TrackerPage::new(source, &cli.code, config.tracker.clone()), &config).await
        }
        Backend::Http => {
            let source = static_page::StaticSource::new();
            watch(TrackerPage::new(source, &cli.code, config.tracker.clone()), &config).await
        }
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let level: LevelFilter = config
        .log_level
        .parse()
        .with_context(|| format!("Invalid log level: {}", config.log_level))?;

    SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
        .context("Failed to initialize logger")
}

async fn watch<R: PageReader>(reader: R, config: &Config) -> Result<()> {
    let notifier = match config.recipient() {
        Some(recipient) => {
            let messenger = WhatsAppMessenger::new(config.whatsapp.clone())?;
            Notifier::new(
                Box::new(messenger),
                recipient,
                reader.url(),
                config.whatsapp.lead_time(),
                config.whatsapp.cooldown(),
            )
        }
        None => Notifier::disabled(reader.url()),
    };

    if notifier.is_enabled() {
        info!("Notifications enabled");
    } else {
        info!("No recipient configured, notifications disabled");
    }

    let mut watcher = Watcher::new(reader, notifier, config.interval(), io::stdout());

    // Runs until killed or a phase fails
    watcher.run(RunLimit::Forever).await
}
