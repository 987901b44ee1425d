//! Errors raised while fetching a rate from a single source

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(StatusCode),

    #[error("Failed to parse rate: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl RateError {
    pub fn parse(msg: impl Into<String>) -> Self {
        RateError::Parse(msg.into())
    }

    /// True when the response arrived but the expected field was missing or malformed.
    pub fn is_parse(&self) -> bool {
        matches!(self, RateError::Parse(_))
    }
}
