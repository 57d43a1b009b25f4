//! HTTP client for the Practicum homework statuses API

use compact_str::CompactString;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::{
    config::ClientConfig,
    error::{ClientError, Result},
};
use crate::cursor::PollCursor;

/// Pure HTTP client for the homework statuses endpoint
///
/// Returns the raw JSON body; shape checks live in [`super::response`].
#[derive(Clone)]
pub struct PracticumApi {
    client: Client,
    endpoint: CompactString,
    token: CompactString,
}

impl PracticumApi {
    pub fn new(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            token: config.credentials.practicum_token.clone(),
        }
    }

    /// Fetch homework statuses changed since `cursor` (or since now when absent)
    #[instrument(skip(self), fields(from_date))]
    pub async fn fetch(&self, cursor: Option<PollCursor>) -> Result<Value> {
        let from_date = cursor.unwrap_or_else(PollCursor::now);
        tracing::Span::current().record("from_date", from_date.timestamp());

        let response = self
            .authenticated_request()
            .query(&[("from_date", from_date.timestamp())])
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = %self.endpoint, error = %e, "Request to the API failed");
                ClientError::fetch_failed(self.endpoint.clone(), e)
            })?;

        self.handle_response(response).await
    }

    /// Create authenticated request builder
    fn authenticated_request(&self) -> RequestBuilder {
        self.client
            .get(self.endpoint.as_str())
            .header("Authorization", format!("OAuth {}", self.token))
    }

    /// Handle HTTP response and parse the JSON body
    async fn handle_response(&self, response: Response) -> Result<Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::fetch_failed(self.endpoint.clone(), e))?;

        if !status.is_success() {
            error!(status = status.as_u16(), "API responded with a non-OK status");
            return Err(ClientError::server_error(status.as_u16(), &body));
        }

        debug!(status = status.as_u16(), body_len = body.len(), "Received API response");

        serde_json::from_str(&body)
            .map_err(|e| ClientError::malformed(format!("response is not valid JSON: {e}")))
    }
}

impl std::fmt::Debug for PracticumApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticumApi")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
