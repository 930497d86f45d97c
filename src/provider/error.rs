//! Error type for provider operations.

/// Error type for provider operations.
///
/// `NotFound` is a sentinel: the resolver distinguishes it from every other
/// failure when walking the ref fallback chain and when mapping errors to
/// host errnos.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The owner, repository, ref, or tree entry was not found.
    #[error("not found")]
    NotFound,

    /// An I/O error occurred while talking to the provider.
    #[error("I/O error: {0}")]
    Io(std::io::Error),

    /// A custom error message.
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for ProviderError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProviderError::NotFound
        } else {
            ProviderError::Io(e)
        }
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
