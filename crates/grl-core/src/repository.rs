use crate::encoding::IdEncoding;
use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    /// The normalised URL a short code redirects to.
    pub original_url: String,
}

impl UrlRecord {
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
        }
    }
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the URL record for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Allocates the next sequence id, encodes it with `encoding` and stores
    /// `record` under the resulting code, all in one atomic write.
    async fn mint(&self, encoding: IdEncoding, record: UrlRecord) -> Result<ShortCode>;
}
