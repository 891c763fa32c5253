//! Reqwest-backed API client. Holds the base URL and shared request
//! helpers; the gateway trait impls live in the sibling modules.
//!
//! Construction takes the configuration values directly (no ambient
//! globals) so tests and demo mode can swap the whole client out.

use crate::domain::DomainError;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client for the APR backend.
pub struct ApiClient {
    http: reqwest::Client,
    /// Separate client without a timeout: the summary stream is long-lived
    /// and the request timeout covers the whole body read.
    streaming: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. "http://localhost:8000").
    /// `timeout` bounds every request/response call; timeouts surface as
    /// `DomainError::Timeout`, distinct from other transport failures.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Transport(format!("failed to build HTTP client: {e}")))?;
        let streaming = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DomainError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            streaming,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> DomainError {
        if e.is_timeout() {
            DomainError::Timeout(self.timeout_secs)
        } else {
            DomainError::Transport(e.to_string())
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DomainError> {
        let mut request = self.http.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, DomainError> {
        let mut request = self.http.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), DomainError> {
        let response = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check_status(response).await?;
        Ok(())
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        form: reqwest::multipart::Form,
    ) -> Result<T, DomainError> {
        let response = self
            .http
            .post(self.url(path))
            .query(query)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::decode(response).await
    }

    /// Open a response whose body will be consumed as a byte stream.
    pub(crate) async fn get_stream(&self, path: &str) -> Result<reqwest::Response, DomainError> {
        let response = self
            .streaming
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Self::check_status(response).await
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(DomainError::Status {
            status,
            body: body.chars().take(200).collect(),
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DomainError> {
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| DomainError::Payload(e.to_string()))
    }
}
