use std::future::Future;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::Config;
use crate::error::ExchangeError;

/// Sends one question to the reading service and yields the reply text.
///
/// This is the only suspension point of a conversation. Implementations must
/// report every failure as an `ExchangeError` rather than panic, so the
/// conversation can always clear its waiting flag.
pub trait ReadingTransport {
    fn exchange(&self, message: &str) -> impl Future<Output = Result<String, ExchangeError>> + Send;
}

// Body of POST <endpoint>
#[derive(Serialize)]
struct ReadingRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize, Debug)]
struct ReadingReply {
    response: String, // The reading text, newlines included
    #[serde(default)]
    status: Option<String>,
}

/// `ReadingTransport` over HTTP. No timeout or retry is layered on top of reqwest's defaults.
#[derive(Debug, Clone)]
pub struct HttpReadingClient {
    client: Client,
    endpoint: Url,
}

impl HttpReadingClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl ReadingTransport for HttpReadingClient {
    #[instrument(skip(self, message), fields(endpoint = %self.endpoint, len = message.len()))]
    async fn exchange(&self, message: &str) -> Result<String, ExchangeError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ReadingRequest { message })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Reading service request failed");
            return Err(ExchangeError::Status { status, body });
        }

        let reply = response
            .json::<ReadingReply>()
            .await
            .map_err(|e| ExchangeError::MalformedReply(e.to_string()))?;

        debug!(status = ?reply.status, response = ?reply.response, "Received reading");
        Ok(reply.response)
    }
}
