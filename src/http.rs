//! Transport seam between the pipelines and the network

use std::future::Future;

use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{NcbiError, Result};
use crate::rate_limit::RateLimiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A successful (2xx) response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Raw payload, for parsers that honour the XML prolog encoding
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs one request and returns the payload or the failure
///
/// Implementations report non-success statuses as [`NcbiError::ApiError`].
pub trait Fetch {
    fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<FetchResponse>> + Send;
}

/// reqwest-backed [`Fetch`] sharing one rate limiter across requests
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    rate_limiter: RateLimiter,
}

impl HttpFetcher {
    /// Build a client with the configured timeout, user agent and rate limit
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.effective_user_agent())
            .build()?;

        Ok(Self {
            client,
            rate_limiter: config.create_rate_limiter(),
        })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(skip(self, params), fields(param_count = params.len()))]
    async fn fetch(
        &self,
        method: HttpMethod,
        url: &str,
        params: &[(String, String)],
    ) -> Result<FetchResponse> {
        self.rate_limiter.acquire().await?;

        let request = match method {
            HttpMethod::Post => self.client.post(url).form(params),
            HttpMethod::Get if params.is_empty() => self.client.get(url),
            HttpMethod::Get => self.client.get(url).query(params),
        };

        debug!("Sending request");
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("Request failed with status: {}", status);
            return Err(NcbiError::ApiError {
                status: status.as_u16(),
                message: format!(
                    "HTTP {}: {}",
                    status,
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
            });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Received response");
        Ok(FetchResponse::new(status.as_u16(), body.to_vec()))
    }
}
