use thiserror::Error;

/// Errors raised while fetching or decoding the message dataset.
///
/// [`SourceError::Http`] and [`SourceError::Parse`] make up the
/// "source unavailable" class (see [`SourceError::is_unavailable`]);
/// [`SourceError::SchemaMismatch`] means the document arrived but does not
/// carry the expected columns or types.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network, TLS, timeout or non-2xx failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The body is not a readable CSV document.
    #[error("CSV parse error for {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: csv::Error,
    },

    /// A required column is missing or holds a value of the wrong type.
    #[error("schema mismatch on column '{column}': {reason}")]
    SchemaMismatch { column: String, reason: String },

    #[error("invalid dataset URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl SourceError {
    /// `true` for network and parse failures.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SourceError::Http(_) | SourceError::Parse { .. })
    }
}
