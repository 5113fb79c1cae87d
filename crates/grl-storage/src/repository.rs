use std::sync::Arc;

use async_trait::async_trait;
use grl_core::repository::{ReadRepository, Repository, Result, UrlRecord};
use grl_core::{IdEncoding, ShortCode, StorageError};
use tracing::{debug, trace};

use crate::store::Store;

/// Repository backed by one collection of the embedded [`Store`].
///
/// Keys are the encoded short codes, values the URL bytes. The store is
/// synchronous, so every call runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct StoreRepository {
    store: Store,
    collection: Arc<str>,
}

impl StoreRepository {
    /// Creates a repository over an already ensured collection.
    pub fn new(store: Store, collection: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Gives the store back, e.g. to close it on shutdown.
    pub fn into_store(self) -> Store {
        self.store
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Store, &str) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        let collection = Arc::clone(&self.collection);

        tokio::task::spawn_blocking(move || f(&store, &collection))
            .await
            .map_err(|e| StorageError::Unavailable(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl ReadRepository for StoreRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let key = code.clone();

        let value = self
            .blocking(move |store, collection| {
                store.with_read(|tx| tx.get(collection, key.as_bytes()))
            })
            .await?;

        let Some(bytes) = value else {
            trace!(code = %code, "short code not found");
            return Ok(None);
        };

        let original_url = String::from_utf8(bytes).map_err(|e| {
            StorageError::InvalidData(format!("url stored under '{code}' is not utf-8: {e}"))
        })?;

        Ok(Some(UrlRecord { original_url }))
    }
}

#[async_trait]
impl Repository for StoreRepository {
    async fn mint(&self, encoding: IdEncoding, record: UrlRecord) -> Result<ShortCode> {
        let code = self
            .blocking(move |store, collection| {
                store.with_write(|tx| {
                    let id = tx.next_sequence(collection)?;
                    let code = encoding.encode(id);
                    tx.put(collection, code.as_bytes(), record.original_url.as_bytes())?;
                    Ok(code)
                })
            })
            .await?;

        debug!(code = %code, collection = %self.collection, "minted short code");
        Ok(code)
    }
}
