//! HTTP transport seam for the query sources.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::SourceError;

/// HTTP response with the body read as text.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Fail with [`SourceError::Status`] unless the status is 2xx.
    pub fn ensure_success(self) -> Result<Self, SourceError> {
        if (200..300).contains(&self.status) {
            Ok(self)
        } else {
            Err(SourceError::Status {
                status: self.status,
            })
        }
    }
}

/// Minimal HTTP client used by the suggestion and trends sources.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request.
    async fn get(&self, url: &str) -> Result<HttpResponse, SourceError>;

    /// Perform a POST request with a form-encoded body.
    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, SourceError>;
}

/// HTTP client backed by `reqwest`.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a client with a 30 s timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("sortie/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, SourceError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| SourceError::Request {
            message: format!("failed to read response body: {e}"),
        })?;
        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, SourceError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Request {
                message: e.to_string(),
            })?;
        Self::read(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpResponse, SourceError> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| SourceError::Request {
                message: e.to_string(),
            })?;
        Self::read(response).await
    }
}
