use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Element '{selector}' not present after {waited:?}")]
    LookupTimeout { selector: String, waited: Duration },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Messenger error: {0}")]
    Messenger(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<chromiumoxide::error::CdpError> for WatchError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        WatchError::Browser(e.to_string())
    }
}
