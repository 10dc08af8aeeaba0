// src/error.rs

//! Error taxonomy for the watcher.
//!
//! Only [`ConfigError`] is allowed to stop the process. Everything else is
//! caught at the nearest boundary (per adapter, per send, per store load)
//! and turned into a logged warning.

use std::fmt;

use thiserror::Error;

/// One adapter failed to produce listings for this run.
#[derive(Error, Debug)]
pub enum SourceFetchError {
    /// Network failure, timeout, or non-2xx response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Search URL could not be built
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

impl SourceFetchError {
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }
}

/// One notification could not be delivered.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("transport request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Reading or writing the seen-store file failed.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed store content: {0}")]
    Json(#[from] serde_json::Error),
}

/// Startup configuration is missing or invalid. Fatal.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
