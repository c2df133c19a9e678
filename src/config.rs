use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NcbiError, Result};
use crate::rate_limit::RateLimiter;

const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const DEFAULT_DOWNLOAD_URL: &str = "https://ftp.ncbi.nlm.nih.gov/pubmed";
const DEFAULT_TOOL: &str = "ncbiutils-rs";

/// Largest number of records E-utilities return for one request
pub const MAX_RETMAX: usize = 10_000;

/// Configuration shared by the retrieval pipelines
///
/// ```
/// use ncbiutils::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new()
///     .with_api_key("your_api_key_here")
///     .with_email("researcher@university.edu")
///     .with_retmax(500)
///     .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(config.effective_rate_limit(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// NCBI API key, raises the rate limit to 10 requests/second
    pub api_key: Option<String>,
    /// Contact e-mail sent with every request
    pub email: Option<String>,
    /// Tool name sent with every request
    pub tool: Option<String>,
    /// Requests per second; overrides the key-dependent default
    pub rate_limit: Option<f64>,
    /// HTTP request timeout
    pub timeout: Duration,
    /// E-utilities base URL
    pub base_url: Option<String>,
    /// Base URL of the baseline and update file archive
    pub download_url: Option<String>,
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Identifiers per batch
    pub retmax: usize,
    /// Batches fetched ahead of the consumer
    pub concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: None,
            rate_limit: None,
            timeout: Duration::from_secs(5),
            base_url: None,
            download_url: None,
            user_agent: None,
            retmax: MAX_RETMAX,
            concurrency: 1,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration from `NCBI_API_KEY` and `NCBI_EMAIL`, if set
    ///
    /// Blank values are ignored. Everything else keeps its default.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ncbiutils::ClientConfig;
    ///
    /// // NCBI_API_KEY=... NCBI_EMAIL=me@example.com
    /// let config = ClientConfig::from_env().with_retmax(200);
    /// ```
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(api_key) = std::env::var("NCBI_API_KEY") {
            if !api_key.trim().is_empty() {
                config.api_key = Some(api_key);
            }
        }
        if let Ok(email) = std::env::var("NCBI_EMAIL") {
            if !email.trim().is_empty() {
                config.email = Some(email);
            }
        }
        config
    }

    /// Set the NCBI API key
    ///
    /// # Arguments
    ///
    /// * `api_key` - Key from the NCBI account settings page
    ///
    /// With a key the default rate limit rises from 3 to 10 requests per second.
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_tool<S: Into<String>>(mut self, tool: S) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: f64) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_download_url<S: Into<String>>(mut self, download_url: S) -> Self {
        self.download_url = Some(download_url.into());
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the number of identifiers sent per request
    ///
    /// # Arguments
    ///
    /// * `retmax` - Batch size, between 1 and [`MAX_RETMAX`]
    ///
    /// The value is checked when a pipeline is built, not here.
    pub fn with_retmax(mut self, retmax: usize) -> Self {
        self.retmax = retmax;
        self
    }

    /// Values below 1 are treated as 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Requests per second actually applied
    pub fn effective_rate_limit(&self) -> f64 {
        match (self.rate_limit, &self.api_key) {
            (Some(rate), _) => rate,
            (None, Some(_)) => 10.0,
            (None, None) => 3.0,
        }
    }

    pub fn effective_base_url(&self) -> &str {
        trim_base(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
    }

    pub fn effective_download_url(&self) -> &str {
        trim_base(self.download_url.as_deref().unwrap_or(DEFAULT_DOWNLOAD_URL))
    }

    pub fn effective_tool(&self) -> &str {
        self.tool.as_deref().unwrap_or(DEFAULT_TOOL)
    }

    pub fn effective_user_agent(&self) -> String {
        if let Some(user_agent) = &self.user_agent {
            return user_agent.clone();
        }
        let base = format!("ncbiutils-rs/{}", env!("CARGO_PKG_VERSION"));
        match &self.email {
            Some(email) => format!("{base} (mailto:{email})"),
            None => base,
        }
    }

    /// `api_key`, `email` and `tool` query parameters, when configured
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(api_key) = &self.api_key {
            params.push(("api_key".to_string(), api_key.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email".to_string(), email.clone()));
        }
        if self.tool.is_some() || self.email.is_some() {
            params.push(("tool".to_string(), self.effective_tool().to_string()));
        }
        params
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }

    /// Reject batch sizes E-utilities would not honour
    pub fn validate_retmax(&self) -> Result<()> {
        if self.retmax == 0 || self.retmax > MAX_RETMAX {
            return Err(NcbiError::InvalidRetmax {
                value: self.retmax,
                maximum: MAX_RETMAX,
            });
        }
        Ok(())
    }
}

fn trim_base(url: &str) -> &str {
    url.trim_end_matches('/')
}
