//! Storage for the grl URL shortener.
//!
//! [`Store`] wraps an embedded single-file database (redb) with named
//! collections, closure-scoped transactions and a durable per-collection
//! sequence. [`StoreRepository`] maps short codes onto one collection of it;
//! [`InMemoryRepository`] is a volatile stand-in for tests.

pub mod memory;
pub mod repository;
pub mod store;

pub use grl_core::repository::{ReadRepository, Repository, UrlRecord};
pub use grl_core::StorageError;
pub use memory::InMemoryRepository;
pub use repository::StoreRepository;
pub use store::{CollectionPolicy, ReadTx, Store, WriteTx};
