use thiserror::Error;

/// Error types for citation extraction and E-utilities retrieval
#[derive(Error, Debug)]
pub enum NcbiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Upstream responded with a non-success status
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// Payload is not well-formed XML
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// Document root is not the container the dialect expects
    #[error("XML document does not contain a {expected} (found <{found}>)")]
    MissingRootContainer { expected: String, found: String },

    /// Path expression could not be parsed
    #[error("Invalid path expression {path:?}: {message}")]
    InvalidPath { path: String, message: String },

    /// Per-request cap outside the accepted range
    #[error("Invalid retmax {value}: must be a positive number no greater than {maximum}")]
    InvalidRetmax { value: usize, maximum: usize },

    /// Response format without a citation extractor
    #[error("Unsupported response format: retmode={retmode}")]
    UnsupportedFormat { retmode: String },

    /// Archive file could not be gunzipped
    #[error("Failed to decompress {file}: {message}")]
    DecompressionError { file: String, message: String },

    /// API rate limit exceeded
    #[error("API rate limit exceeded")]
    RateLimitExceeded,
}

pub type Result<T> = std::result::Result<T, NcbiError>;

impl NcbiError {
    /// Errors raised before any network activity because the call was set up wrongly
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            NcbiError::InvalidRetmax { .. }
                | NcbiError::UnsupportedFormat { .. }
                | NcbiError::InvalidPath { .. }
        )
    }

    /// Errors the pipeline absorbs into a failed chunk
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            NcbiError::RequestError(_)
                | NcbiError::ApiError { .. }
                | NcbiError::DecompressionError { .. }
                | NcbiError::RateLimitExceeded
        )
    }

    /// Errors caused by the shape of the document itself
    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            NcbiError::MissingRootContainer { .. } | NcbiError::XmlError(_)
        )
    }
}
