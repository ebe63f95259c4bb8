//! Transport seam for the chat endpoint
//!
//! The session controller only sees [`ChatTransport`]; tests script it with
//! canned byte streams, production uses [`HttpTransport`] over reqwest.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use url::Url;

use crate::chat::protocol::ChatRequest;
use crate::{Error, Result};

/// Response body delivered as arbitrarily-sized byte pieces
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Issues one chat request and hands back the raw response body
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the request, returning the body stream on success
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] for rejected requests (non-success
    /// status) and network-level failures.
    async fn send(&self, request: &ChatRequest) -> Result<ByteStream>;
}

/// HTTP transport POSTing to a single fixed endpoint URL
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport for the given endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// The configured endpoint URL
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ByteStream> {
        tracing::debug!(
            endpoint = %self.endpoint,
            history_len = request.history.len(),
            "sending chat request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat request failed");
                Error::Transport(e.to_string())
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat endpoint error");
            return Err(Error::Transport(format!(
                "chat endpoint error {status}: {body}"
            )));
        }

        let stream = response
            .bytes_stream()
            .map_ok(|piece| piece.to_vec())
            .map_err(|e| Error::Transport(e.to_string()));

        Ok(Box::pin(stream))
    }
}
