use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    /// Empty or malformed catalog source. The build is aborted.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Invalid query or engine parameters, rejected before any work.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The embedder or the vector backend failed or broke its contract.
    #[error("{collaborator} failed: {source}")]
    Collaborator {
        collaborator: &'static str,
        #[source]
        source: BoxError,
    },
}

impl Error {
    pub fn collaborator(collaborator: &'static str, err: impl Into<BoxError>) -> Self {
        Self::Collaborator { collaborator, source: err.into() }
    }

    /// Collaborator failures may succeed when retried; everything else is
    /// caused by the input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Collaborator { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
