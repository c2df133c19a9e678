use crate::error::{NcbiError, Result};
use crate::models::Citation;

/// One batch of pipeline output
///
/// `ids` always holds the batch's identifiers (or the file name for a
/// download), whether or not the batch succeeded.
#[derive(Debug)]
pub struct Chunk {
    pub ids: Vec<String>,
    pub result: Result<Vec<Citation>>,
}

impl Chunk {
    pub fn success(ids: Vec<String>, citations: Vec<Citation>) -> Self {
        Self {
            ids,
            result: Ok(citations),
        }
    }

    pub fn failure(ids: Vec<String>, error: NcbiError) -> Self {
        Self {
            ids,
            result: Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&NcbiError> {
        self.result.as_ref().err()
    }

    pub fn citations(&self) -> Option<&[Citation]> {
        self.result.as_deref().ok()
    }
}
