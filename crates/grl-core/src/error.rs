use thiserror::Error;

/// Errors related to the core types of the URL shortener.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown id encoding '{0}', expected 'hex' or 'decimal'")]
    UnknownEncoding(String),
}

/// Errors raised by the embedded key-value store and the repositories on top of it.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("collection already exists: {0}")]
    CollectionExists(String),
    #[error("collection does not exist: {0}")]
    CollectionMissing(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("store is still in use by {0} other handle(s)")]
    InUse(usize),
}

/// Errors returned by the shortener service.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("{0}")]
    Storage(#[from] StorageError),
}
