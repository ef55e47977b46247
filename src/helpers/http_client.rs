use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use thiserror::Error;

/// Error types that can occur when talking to the HTTP transport
#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("HTTP request error: {0}")]
    RequestError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to read response body: {0}")]
    BodyError(String),
}

/// HTTP Basic credentials. Both parts travel together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Raw HTTP reply as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, undecoded
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// The single capability the LMS client needs from the network: POST a JSON
/// document and hand back the status code and body.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Send a POST request with a serialized JSON body
    ///
    /// # Arguments
    /// * `url` - Full request URL
    /// * `body` - Serialized JSON payload
    /// * `auth` - Optional Basic auth credentials
    /// * `timeout` - Upper bound for the whole exchange
    async fn post(
        &self,
        url: &str,
        body: &str,
        auth: Option<&Credentials>,
        timeout: Duration,
    ) -> Result<HttpResponse, HttpClientError>;
}

/// An HTTP transport implementation using reqwest
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new transport with a fresh reqwest client
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a transport sharing an existing reqwest client (and its connection pool)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpClient {
    async fn post(
        &self,
        url: &str,
        body: &str,
        auth: Option<&Credentials>,
        timeout: Duration,
    ) -> Result<HttpResponse, HttpClientError> {
        debug!("POST request to {}", url);

        let mut request = self.client
            .post(url)
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .body(body.to_string());

        if let Some(credentials) = auth {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                error!("POST request to {} timed out after {:?}", url, timeout);
                return Err(HttpClientError::Timeout(timeout));
            }
            Err(e) => {
                error!("POST request failed: {}", e);
                return Err(HttpClientError::RequestError(e.to_string()));
            }
        };

        let status = response.status().as_u16();

        match response.text().await {
            Ok(text) => Ok(HttpResponse::new(status, text)),
            Err(e) if e.is_timeout() => Err(HttpClientError::Timeout(timeout)),
            Err(e) => {
                error!("Failed to read response body: {}", e);
                Err(HttpClientError::BodyError(e.to_string()))
            }
        }
    }
}
