use async_trait::async_trait;
use log::{debug, trace};

use crate::error::{ExplorerError, Result};

/// Raw HTTP exchange result. Status interpretation is left to the adapter:
/// the services disagree on what a successful broadcast returns.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Body on the expected status, `Server` error on anything else.
    pub fn require_status(self, expected: u16) -> Result<String> {
        if self.status != expected {
            return Err(ExplorerError::Server {
                status: self.status,
                body: self.body,
            });
        }

        Ok(self.body)
    }
}

/// Minimal client seam the adapters talk through. Swap it out in tests to
/// script responses without a network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        ReqwestTransport {
            client: reqwest::Client::new(),
        }
    }

    /// Callers that need timeouts or proxies configure the client themselves.
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }

    async fn read(&self, response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ExplorerError::Transport(e.to_string()))?;
        trace!("response status={} body=`{}`", status, body.trim());

        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        ReqwestTransport::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExplorerError::Transport(e.to_string()))?;

        self.read(response).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ExplorerError::Transport(e.to_string()))?;

        self.read(response).await
    }
}
