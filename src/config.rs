use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "./parcel-watch.toml";

#[derive(Parser, Debug)]
#[clap(name = "parcel-watch", version, about = "Watch a parcel tracker page for new log entries")]
pub struct Cli {
    /// Tracking code for your order
    pub code: String,

    /// Browser backend used to load the tracker page
    #[clap(short, long, value_enum)]
    pub browser: Option<Backend>,

    /// Seconds to sleep between refreshes
    #[clap(short = 't', long)]
    pub interval: Option<u64>,

    /// WhatsApp number to be notified when entries are added
    #[clap(short, long)]
    pub notify: Option<String>,

    /// Show the browser window instead of running headless
    #[clap(short = 'H', long)]
    pub show_browser: bool,

    /// Path to configuration file
    #[clap(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Headless Chromium over the DevTools protocol
    Chromium,
    /// Plain HTTP fetch, for trackers rendered server-side
    Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub interval_secs: u64,
    pub recipient: String,
    pub browser: Backend,
    pub headless: bool,
    pub tracker: TrackerConfig,
    pub whatsapp: WhatsAppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            interval_secs: 300,
            recipient: String::new(),
            browser: Backend::Chromium,
            headless: true,
            tracker: TrackerConfig::default(),
            whatsapp: WhatsAppConfig::default(),
        }
    }
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Recipient, or `None` when notifications are disabled.
    pub fn recipient(&self) -> Option<&str> {
        let r = self.recipient.trim();
        (!r.is_empty()).then_some(r)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub base_url: String,
    pub container_selector: String,
    pub row_selector: String,
    pub cell_selector: String,
    pub lookup_timeout_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://apps.chazki.com/tracker".to_string(),
            container_selector: "#logs".to_string(),
            row_selector: "tr".to_string(),
            cell_selector: "td".to_string(),
            lookup_timeout_secs: 40,
        }
    }
}

impl TrackerConfig {
    pub fn url_for(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub token: String,
    pub phone_number_id: String,
    pub api_version: String,
    pub lead_time_secs: u64,
    pub cooldown_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            phone_number_id: String::new(),
            api_version: "v20.0".to_string(),
            lead_time_secs: 20,
            cooldown_secs: 3,
        }
    }
}

impl WhatsAppConfig {
    pub fn lead_time(&self) -> Duration {
        Duration::from_secs(self.lead_time_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => read_config_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            read_config_file(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, cli);

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&config_content).context("Failed to parse config file")
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(browser) = cli.browser {
        config.browser = browser;
    }

    if let Some(interval) = cli.interval {
        config.interval_secs = interval;
    }

    if let Some(ref notify) = cli.notify {
        config.recipient = notify.clone();
    }

    if cli.show_browser {
        config.headless = false;
    }
}
