use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use grl_core::repository::{ReadRepository, Repository, Result, UrlRecord};
use grl_core::{IdEncoding, ShortCode};

/// In-memory implementation of the Repository trait using DashMap.
///
/// Ids come from an atomic counter starting at 1, so codes match what a fresh
/// [`StoreRepository`](crate::StoreRepository) would hand out. Nothing survives
/// a restart.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, String>,
    sequence: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self
            .storage
            .get(code.as_str())
            .map(|entry| UrlRecord::new(entry.value().clone())))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn mint(&self, encoding: IdEncoding, record: UrlRecord) -> Result<ShortCode> {
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let code = encoding.encode(id);
        self.storage
            .insert(code.as_str().to_owned(), record.original_url);
        Ok(code)
    }
}
