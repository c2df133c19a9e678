//! Chunked retrieval over NCBI E-utilities and the PubMed file archive
//!
//! Both pipelines return a lazy [`Stream`](futures_util::Stream) of
//! `Result<Chunk>` in input order. Nothing is requested until the stream is
//! polled, and dropping it stops further work. Transport and decompression
//! failures stay inside their [`Chunk`]; a structural error is the last item.

pub mod chunk;
pub mod download;
pub mod efetch;
pub mod params;

pub use chunk::Chunk;
pub use download::Download;
pub use efetch::Efetch;
pub use params::{Db, DownloadPath, FetchOptions, RetMode, RetType};

use std::future;

use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::Citation;
use crate::parser::Dialect;

/// Parse a payload, keeping only citations that carry an identifier
pub(crate) fn collect_citations(dialect: Dialect, payload: &[u8]) -> Result<Vec<Citation>> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        debug!("Empty payload, no citations");
        return Ok(Vec::new());
    }

    let mut citations = dialect.parse_bytes(payload)?;
    let before = citations.len();
    citations.retain(Citation::has_identifier);

    let dropped = before - citations.len();
    if dropped > 0 {
        warn!(dropped, "Dropped records without an identifier");
    }
    Ok(citations)
}

/// Pass items through up to and including the first `Err`
pub(crate) fn stop_after_error<S, T>(items: S) -> impl Stream<Item = Result<T>>
where
    S: Stream<Item = Result<T>>,
{
    items.scan(false, |failed, item| {
        if *failed {
            return future::ready(None);
        }
        *failed = item.is_err();
        future::ready(Some(item))
    })
}
