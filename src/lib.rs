//! # ncbiutils
//!
//! Citation extraction from PubMed and PMC XML, and chunked retrieval of
//! citations from NCBI E-utilities and the PubMed file archive.
//!
//! ## Features
//!
//! - **Two dialects, one model**: `PubmedArticleSet` and `pmc-articleset`
//!   documents both map onto [`Citation`]
//! - **Best-effort extraction**: missing fields are `None`, never errors
//! - **Chunked pipelines**: large identifier lists become a lazy stream of
//!   per-batch [`Chunk`]s; one failed batch never stops the rest
//! - **Rate limiting**: NCBI's 3/10 requests per second limits are honoured
//!
//! ## Quick Start
//!
//! ### Parsing a document
//!
//! ```
//! use ncbiutils::{CitationParser, PubmedXmlParser};
//!
//! let xml = br#"<PubmedArticleSet>
//!   <PubmedArticle>
//!     <MedlineCitation>
//!       <PMID>31302001</PMID>
//!       <Article><ArticleTitle>Mitochondrial proteins</ArticleTitle></Article>
//!     </MedlineCitation>
//!   </PubmedArticle>
//! </PubmedArticleSet>"#;
//!
//! let citations = PubmedXmlParser.parse_bytes(xml).unwrap();
//! assert_eq!(citations[0].pmid, "31302001");
//! assert_eq!(citations[0].title, "Mitochondrial proteins");
//! ```
//!
//! ### Fetching in batches
//!
//! ```no_run
//! use futures_util::StreamExt;
//! use ncbiutils::{ClientConfig, Efetch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env().with_retmax(500);
//!     let efetch = Efetch::pubmed(config)?;
//!
//!     let ids: Vec<String> = (31302001..31303001).map(|id| id.to_string()).collect();
//!     let mut chunks = std::pin::pin!(efetch.chunks(ids));
//!     while let Some(chunk) = chunks.next().await {
//!         // Err here means a response could not be parsed; the stream ends after it
//!         let chunk = chunk?;
//!         if let Some(err) = chunk.error() {
//!             eprintln!("{} ids failed: {}", chunk.ids.len(), err);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod eutils;
pub mod http;
pub mod models;
pub mod parser;
pub mod pmc;
pub mod pubmed;
pub mod rate_limit;
pub mod xml;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::{NcbiError, Result};
pub use eutils::{Chunk, Db, Download, DownloadPath, Efetch, FetchOptions, RetMode, RetType};
pub use http::{Fetch, FetchResponse, HttpFetcher, HttpMethod};
pub use models::{Author, Citation, Correspondence, Journal, MeshHeading, MeshTerm};
pub use parser::{CitationParser, Dialect};
pub use pmc::PmcXmlParser;
pub use pubmed::PubmedXmlParser;
pub use rate_limit::RateLimiter;
pub use xml::XmlTree;
