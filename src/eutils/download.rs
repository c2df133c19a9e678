use std::io::Read;

use flate2::read::GzDecoder;
use futures_util::{Stream, StreamExt, stream};
use tracing::{debug, error, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{NcbiError, Result};
use crate::eutils::chunk::Chunk;
use crate::eutils::{collect_citations, stop_after_error};
use crate::eutils::params::DownloadPath;
use crate::http::{Fetch, HttpFetcher, HttpMethod};
use crate::parser::Dialect;

/// Retrieves gzip-compressed archive files, one [`Chunk`] per file
///
/// Files are fetched from `<download_url>/<path>/<file>`. The PubMed baseline
/// and update files are `PubmedArticleSet` documents, so that dialect is the
/// default. A fetch or gunzip failure stays in that file's chunk; a file
/// that does not parse as the dialect ends the stream with `Err`.
///
/// ```no_run
/// use futures_util::TryStreamExt;
/// use ncbiutils::{ClientConfig, Download, DownloadPath};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let download = Download::new(ClientConfig::new(), DownloadPath::UpdateFiles)?;
///     let files = vec!["pubmed24n1220.xml.gz".to_string()];
///
///     let chunks: Vec<_> = download.chunks(files).try_collect().await?;
///     println!("{} files processed", chunks.len());
///     Ok(())
/// }
/// ```
pub struct Download<F = HttpFetcher> {
    fetcher: F,
    config: ClientConfig,
    path: DownloadPath,
    dialect: Dialect,
}

impl Download<HttpFetcher> {
    pub fn new(config: ClientConfig, path: DownloadPath) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, path, fetcher))
    }
}

impl<F: Fetch> Download<F> {
    pub fn with_fetcher(config: ClientConfig, path: DownloadPath, fetcher: F) -> Self {
        Self {
            fetcher,
            config,
            path,
            dialect: Dialect::default(),
        }
    }

    /// Parse the decompressed files as `dialect`
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn file_url(&self, file: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.effective_download_url(),
            self.path,
            file.trim_start_matches('/')
        )
    }

    /// Lazily download and parse `files` in order
    pub fn chunks(&self, files: Vec<String>) -> impl Stream<Item = Result<Chunk>> + '_ {
        debug!(files = files.len(), path = %self.path, "Prepared archive downloads");
        let chunks = stream::iter(files)
            .map(move |file| self.fetch_file(file))
            .buffered(self.config.concurrency.max(1));
        stop_after_error(chunks)
    }

    #[instrument(skip(self), fields(path = %self.path))]
    async fn fetch_file(&self, file: String) -> Result<Chunk> {
        let xml = match self.download(&file).await {
            Ok(xml) => xml,
            Err(e) => {
                warn!(error = %e, "Archive file failed");
                return Ok(Chunk::failure(vec![file], e));
            }
        };

        match collect_citations(self.dialect, &xml) {
            Ok(citations) => {
                info!(parsed = citations.len(), "Archive file completed");
                Ok(Chunk::success(vec![file], citations))
            }
            Err(e) => {
                error!(error = %e, "Failed to parse archive file");
                Err(e)
            }
        }
    }

    /// Fetch and gunzip one file
    async fn download(&self, file: &str) -> Result<Vec<u8>> {
        let response = self
            .fetcher
            .fetch(HttpMethod::Get, &self.file_url(file), &[])
            .await?;
        let xml = gunzip(file, response.bytes())?;
        debug!(
            compressed = response.body.len(),
            decompressed = xml.len(),
            "Decompressed archive file"
        );
        Ok(xml)
    }
}

fn gunzip(file: &str, data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut xml = Vec::new();
    decoder
        .read_to_end(&mut xml)
        .map_err(|e| NcbiError::DecompressionError {
            file: file.to_string(),
            message: e.to_string(),
        })?;
    Ok(xml)
}
