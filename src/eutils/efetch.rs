use futures_util::{Stream, StreamExt, stream};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::eutils::chunk::Chunk;
use crate::eutils::{collect_citations, stop_after_error};
use crate::eutils::params::{Db, FetchOptions};
use crate::http::{Fetch, HttpFetcher, HttpMethod};
use crate::parser::Dialect;

/// EFetch pipeline: identifiers in, one [`Chunk`] per `retmax`-sized batch out
///
/// ```no_run
/// use futures_util::StreamExt;
/// use ncbiutils::{ClientConfig, Efetch};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let efetch = Efetch::pubmed(ClientConfig::new().with_retmax(200))?;
///     let ids = vec!["31302001".to_string(), "22454523".to_string()];
///
///     let mut chunks = std::pin::pin!(efetch.chunks(ids));
///     while let Some(chunk) = chunks.next().await {
///         let chunk = chunk?;
///         match chunk.citations() {
///             Some(citations) => println!("{} citations", citations.len()),
///             None => eprintln!("batch {:?} failed: {:?}", chunk.ids, chunk.error()),
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct Efetch<F = HttpFetcher> {
    fetcher: F,
    config: ClientConfig,
    options: FetchOptions,
    dialect: Dialect,
}

impl Efetch<HttpFetcher> {
    /// Build a pipeline over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - Batch size, rate limit, API key and endpoints
    /// * `options` - Database and response format
    ///
    /// Fails on an out-of-range `retmax` or a non-XML `retmode`, before any
    /// request is made.
    ///
    /// # Example
    ///
    /// ```
    /// use ncbiutils::{ClientConfig, Db, Efetch, FetchOptions, RetMode};
    ///
    /// let efetch = Efetch::new(ClientConfig::new(), FetchOptions::new(Db::Pmc)).unwrap();
    /// assert!(efetch.url().ends_with("/efetch.fcgi"));
    ///
    /// let text = FetchOptions::new(Db::Pubmed).with_retmode(RetMode::Text);
    /// assert!(Efetch::new(ClientConfig::new(), text).is_err());
    /// ```
    pub fn new(config: ClientConfig, options: FetchOptions) -> Result<Self> {
        let dialect = Self::validate(&config, &options)?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self {
            fetcher,
            config,
            options,
            dialect,
        })
    }

    /// PubMed abstracts as XML
    pub fn pubmed(config: ClientConfig) -> Result<Self> {
        Self::new(config, FetchOptions::new(Db::Pubmed))
    }

    /// PMC articles as XML
    pub fn pmc(config: ClientConfig) -> Result<Self> {
        Self::new(config, FetchOptions::new(Db::Pmc))
    }
}

impl<F: Fetch> Efetch<F> {
    pub fn with_fetcher(config: ClientConfig, options: FetchOptions, fetcher: F) -> Result<Self> {
        let dialect = Self::validate(&config, &options)?;
        Ok(Self {
            fetcher,
            config,
            options,
            dialect,
        })
    }

    fn validate(config: &ClientConfig, options: &FetchOptions) -> Result<Dialect> {
        config.validate_retmax()?;
        options.dialect()
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub fn url(&self) -> String {
        format!("{}/efetch.fcgi", self.config.effective_base_url())
    }

    fn batch_params(&self, ids: &[String]) -> Vec<(String, String)> {
        let mut params = self.options.to_params();
        params.push(("id".to_string(), ids.join(",")));
        // retstart offsets into the submitted ids, so every batch starts at 0
        params.push(("retstart".to_string(), "0".to_string()));
        params.push(("retmax".to_string(), self.config.retmax.to_string()));
        params.extend(self.config.build_api_params());
        params
    }

    /// Lazily fetch `ids` in contiguous batches of at most `retmax`
    ///
    /// A transport failure is reported in its batch's [`Chunk`] and the
    /// stream moves on. A payload that cannot be parsed as the selected
    /// dialect is yielded as `Err` and ends the stream.
    ///
    /// With `concurrency > 1` up to that many batches are in flight at once;
    /// chunks are still yielded in batch order.
    pub fn chunks(&self, ids: Vec<String>) -> impl Stream<Item = Result<Chunk>> + '_ {
        let batches: Vec<Vec<String>> = ids
            .chunks(self.config.retmax)
            .map(<[String]>::to_vec)
            .collect();
        debug!(
            ids = ids.len(),
            batches = batches.len(),
            "Prepared EFetch batches"
        );

        let chunks = stream::iter(batches)
            .map(move |batch| self.fetch_batch(batch))
            .buffered(self.config.concurrency.max(1));
        stop_after_error(chunks)
    }

    #[instrument(skip(self, ids), fields(db = %self.options.db, batch_size = ids.len()))]
    async fn fetch_batch(&self, ids: Vec<String>) -> Result<Chunk> {
        let params = self.batch_params(&ids);

        let response = match self
            .fetcher
            .fetch(HttpMethod::Post, &self.url(), &params)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "EFetch batch failed");
                return Ok(Chunk::failure(ids, e));
            }
        };

        match collect_citations(self.dialect, response.bytes()) {
            Ok(citations) => {
                info!(
                    requested = ids.len(),
                    parsed = citations.len(),
                    "Batch fetch completed"
                );
                Ok(Chunk::success(ids, citations))
            }
            Err(e) => {
                error!(error = %e, first_id = ?ids.first(), "Failed to parse EFetch response");
                Err(e)
            }
        }
    }
}
