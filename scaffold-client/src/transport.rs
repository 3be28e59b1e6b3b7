//! HTTP transport for API commands

use reqwest::blocking::Client;

use crate::config::ClientConfig;
use crate::{ScaffoldError, ScaffoldResult};

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, undecoded
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs GET requests for the dispatcher
///
/// Any status the server sends back is a response, not an error; only
/// failures to get a response at all are errors.
pub trait Transport: Send + Sync {
    /// GET `url` and return the status and body
    fn get(&self, url: &str) -> ScaffoldResult<HttpResponse>;
}

/// Blocking reqwest transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the configured timeout and user agent
    pub fn new(config: &ClientConfig) -> ScaffoldResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> ScaffoldResult<HttpResponse> {
        let response = self.client.get(url).send().map_err(map_send_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(map_send_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_send_error(error: reqwest::Error) -> ScaffoldError {
    if error.is_timeout() {
        ScaffoldError::Timeout(error.to_string())
    } else {
        ScaffoldError::Transport(error.to_string())
    }
}
