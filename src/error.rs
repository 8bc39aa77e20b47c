use reqwest::StatusCode;
use thiserror::Error;

/// Why an exchange with the reading service failed.
///
/// The conversation never shows these to the user; every variant collapses
/// into the same fallback reply. They exist so the cause can be logged.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("request to reading service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("reading service answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed reply from reading service: {0}")]
    MalformedReply(String),
    #[error("exchange abandoned before the reply arrived")]
    Abandoned,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },
}
