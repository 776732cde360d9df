//! Error types for search operations

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while talking to the search backend
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The backend was never initialized or cannot be reached
    #[error("Search backend unavailable: {0}")]
    Unavailable(String),

    /// The backend returned a structured error for a well-formed request
    #[error("Search backend error: {0}")]
    Backend(String),

    /// The target document of a delete or update does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Caller-supplied input could not be parsed; callers substitute a default
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            SearchError::Unavailable("cannot connect to search backend".to_string())
        } else {
            SearchError::Backend(err.to_string())
        }
    }
}
