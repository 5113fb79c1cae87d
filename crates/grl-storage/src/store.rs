use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use grl_core::StorageError;
use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use tracing::{debug, info, trace, warn};

pub type Result<T> = std::result::Result<T, StorageError>;

/// Catalog of collections and their sequence counters.
///
/// A collection exists once it has a row here; the value is the last id
/// handed out by [`WriteTx::next_sequence`] (0 for a fresh collection).
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new(SEQUENCES_NAME);
const SEQUENCES_NAME: &str = "grl_sequences";

fn collection(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// What [`Store::ensure_collection`] does when the collection already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionPolicy {
    /// Create the collection if it is missing, otherwise reuse it.
    #[default]
    CreateIfMissing,
    /// Refuse to start on a store that already holds the collection.
    MustNotExist,
}

/// A single-file embedded key-value store with named collections, atomic
/// transactions and a durable per-collection sequence.
///
/// Cloning a `Store` is cheap and shares the underlying database. Exactly one
/// write transaction runs at a time; readers work on snapshots and never wait
/// for each other or for the writer.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
    location: Arc<Location>,
}

#[derive(Debug)]
enum Location {
    File(PathBuf),
    Memory,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Memory => f.write_str(":memory:"),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Opens the store at `path`, creating the file if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Database::create(path).map_err(|e| {
            StorageError::Unavailable(format!("cannot open {}: {e}", path.display()))
        })?;

        info!(path = %path.display(), "opened store");

        Ok(Self {
            db: Arc::new(db),
            location: Arc::new(Location::File(path.to_path_buf())),
        })
    }

    /// Creates a volatile store that lives only as long as its handles.
    pub fn in_memory() -> Result<Self> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(unavailable)?;

        Ok(Self {
            db: Arc::new(db),
            location: Arc::new(Location::Memory),
        })
    }

    /// Makes sure the collection `name` exists according to `policy`.
    pub fn ensure_collection(&self, name: &str, policy: CollectionPolicy) -> Result<()> {
        if name == SEQUENCES_NAME {
            return Err(StorageError::InvalidData(format!(
                "collection name '{name}' is reserved"
            )));
        }

        let created = self.with_write(|tx| {
            let mut sequences = tx.txn.open_table(SEQUENCES).map_err(unavailable)?;
            let exists = sequences.get(name).map_err(unavailable)?.is_some();

            match (exists, policy) {
                (true, CollectionPolicy::MustNotExist) => {
                    Err(StorageError::CollectionExists(name.to_string()))
                }
                (true, CollectionPolicy::CreateIfMissing) => Ok(false),
                (false, _) => {
                    sequences.insert(name, 0u64).map_err(unavailable)?;
                    drop(sequences);
                    tx.txn.open_table(collection(name)).map_err(unavailable)?;
                    Ok(true)
                }
            }
        })?;

        debug!(collection = name, created, "collection ready");
        Ok(())
    }

    /// Runs `f` inside a write transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and is rolled back when
    /// `f` returns `Err` or panics. Blocks while another write transaction is
    /// active.
    pub fn with_write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTx) -> Result<T>,
    {
        let txn = self.db.begin_write().map_err(unavailable)?;
        let mut tx = WriteTx { txn };

        match f(&mut tx) {
            Ok(value) => {
                tx.txn.commit().map_err(unavailable)?;
                trace!("write transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = tx.txn.abort() {
                    warn!(error = %abort_err, "failed to abort write transaction");
                }
                debug!(error = %err, "write transaction rolled back");
                Err(err)
            }
        }
    }

    /// Runs `f` against a consistent read-only snapshot.
    pub fn with_read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx) -> Result<T>,
    {
        let txn = self.db.begin_read().map_err(unavailable)?;
        f(&ReadTx { txn })
    }

    /// Releases the database file and its lock.
    ///
    /// Fails with [`StorageError::InUse`] while other clones of this handle
    /// are alive; the file is then released when the last clone is dropped.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.db) {
            Ok(db) => {
                drop(db);
                info!(location = %self.location, "closed store");
                Ok(())
            }
            Err(shared) => Err(StorageError::InUse(Arc::strong_count(&shared) - 1)),
        }
    }
}

/// Handle to an open write transaction.
pub struct WriteTx {
    txn: redb::WriteTransaction,
}

impl WriteTx {
    /// Returns the next unused id of `name`. The counter update is part of
    /// this transaction and is rolled back with it.
    pub fn next_sequence(&mut self, name: &str) -> Result<u64> {
        let mut sequences = self.txn.open_table(SEQUENCES).map_err(unavailable)?;
        let current = sequences
            .get(name)
            .map_err(unavailable)?
            .map(|guard| guard.value())
            .ok_or_else(|| StorageError::CollectionMissing(name.to_string()))?;

        let next = current.checked_add(1).ok_or_else(|| {
            StorageError::InvalidData(format!("sequence of '{name}' is exhausted"))
        })?;
        sequences.insert(name, next).map_err(unavailable)?;

        Ok(next)
    }

    /// Stores `value` under `key`, overwriting any previous value.
    pub fn put(&mut self, name: &str, key: &[u8], value: &[u8]) -> Result<()> {
        self.require(name)?;
        let mut table = self.txn.open_table(collection(name)).map_err(unavailable)?;
        table.insert(key, value).map_err(unavailable)?;
        Ok(())
    }

    /// Reads `key`, including writes made earlier in this transaction.
    pub fn get(&self, name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.require(name)?;
        let table = self.txn.open_table(collection(name)).map_err(unavailable)?;
        let value = table
            .get(key)
            .map_err(unavailable)?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn require(&self, name: &str) -> Result<()> {
        let sequences = self.txn.open_table(SEQUENCES).map_err(unavailable)?;
        if sequences.get(name).map_err(unavailable)?.is_none() {
            return Err(StorageError::CollectionMissing(name.to_string()));
        }
        Ok(())
    }
}

/// Handle to an open read transaction.
pub struct ReadTx {
    txn: redb::ReadTransaction,
}

impl ReadTx {
    /// Point lookup; absence is `Ok(None)`.
    pub fn get(&self, name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let table = match self.txn.open_table(collection(name)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => {
                return Err(StorageError::CollectionMissing(name.to_string()))
            }
            Err(err) => return Err(unavailable(err)),
        };

        let value = table
            .get(key)
            .map_err(unavailable)?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }
}

fn unavailable(err: impl Into<redb::Error>) -> StorageError {
    StorageError::Unavailable(err.into().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const URLS: &str = "Urls";

    fn store() -> Store {
        let store = Store::in_memory().unwrap();
        store
            .ensure_collection(URLS, CollectionPolicy::CreateIfMissing)
            .unwrap();
        store
    }

    #[test]
    fn sequence_starts_at_one_and_increases() {
        let store = store();

        let first = store.with_write(|tx| tx.next_sequence(URLS)).unwrap();
        let second = store.with_write(|tx| tx.next_sequence(URLS)).unwrap();
        let third = store.with_write(|tx| tx.next_sequence(URLS)).unwrap();

        assert_eq!((first, second, third), (1, 2, 3));
    }

    #[test]
    fn sequences_are_scoped_per_collection() {
        let store = store();
        store
            .ensure_collection("Other", CollectionPolicy::CreateIfMissing)
            .unwrap();

        store.with_write(|tx| tx.next_sequence(URLS)).unwrap();
        store.with_write(|tx| tx.next_sequence(URLS)).unwrap();
        let other = store.with_write(|tx| tx.next_sequence("Other")).unwrap();

        assert_eq!(other, 1);
    }

    #[test]
    fn put_then_get() {
        let store = store();

        store
            .with_write(|tx| tx.put(URLS, b"1", b"http://example.com"))
            .unwrap();

        let value = store.with_read(|tx| tx.get(URLS, b"1")).unwrap();
        assert_eq!(value.as_deref(), Some(&b"http://example.com"[..]));
    }

    #[test]
    fn get_missing_key_is_none() {
        let store = store();

        let value = store.with_read(|tx| tx.get(URLS, b"nope")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn write_tx_sees_its_own_writes() {
        let store = store();

        let value = store
            .with_write(|tx| {
                tx.put(URLS, b"k", b"v")?;
                tx.get(URLS, b"k")
            })
            .unwrap();

        assert_eq!(value.as_deref(), Some(&b"v"[..]));
    }

    #[test]
    fn failed_transaction_rolls_back_everything() {
        let store = store();

        let result: Result<()> = store.with_write(|tx| {
            let id = tx.next_sequence(URLS)?;
            tx.put(URLS, id.to_string().as_bytes(), b"http://lost.example")?;
            Err(StorageError::InvalidData("boom".into()))
        });
        assert!(matches!(result, Err(StorageError::InvalidData(_))));

        assert!(store.with_read(|tx| tx.get(URLS, b"1")).unwrap().is_none());
        // the consumed sequence number is rolled back too
        let next = store.with_write(|tx| tx.next_sequence(URLS)).unwrap();
        assert_eq!(next, 1);
    }

    #[test]
    fn unknown_collection_is_reported() {
        let store = store();

        let write = store.with_write(|tx| tx.next_sequence("Missing"));
        assert!(matches!(write, Err(StorageError::CollectionMissing(_))));

        let put = store.with_write(|tx| tx.put("Missing", b"k", b"v"));
        assert!(matches!(put, Err(StorageError::CollectionMissing(_))));

        let read = store.with_read(|tx| tx.get("Missing", b"k"));
        assert!(matches!(read, Err(StorageError::CollectionMissing(_))));
    }

    #[test]
    fn ensure_collection_is_idempotent_by_default() {
        let store = store();
        store.with_write(|tx| tx.next_sequence(URLS)).unwrap();

        store
            .ensure_collection(URLS, CollectionPolicy::CreateIfMissing)
            .unwrap();

        // existing counter is preserved
        let next = store.with_write(|tx| tx.next_sequence(URLS)).unwrap();
        assert_eq!(next, 2);
    }

    #[test]
    fn strict_policy_rejects_existing_collection() {
        let store = store();

        let err = store
            .ensure_collection(URLS, CollectionPolicy::MustNotExist)
            .unwrap_err();
        assert!(matches!(err, StorageError::CollectionExists(name) if name == URLS));
    }

    #[test]
    fn reserved_name_is_rejected() {
        let store = Store::in_memory().unwrap();

        let err = store
            .ensure_collection("grl_sequences", CollectionPolicy::CreateIfMissing)
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[test]
    fn close_fails_while_shared() {
        let store = store();
        let other = store.clone();

        let err = store.close().unwrap_err();
        assert!(matches!(err, StorageError::InUse(1)));

        other.close().unwrap();
    }

    #[test]
    fn concurrent_writers_get_distinct_ids() {
        let store = store();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| store.with_write(|tx| tx.next_sequence(URLS)).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        ids.sort_unstable();

        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
    }
}
