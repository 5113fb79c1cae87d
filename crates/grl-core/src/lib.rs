//! Core types and traits for the grl URL shortener.
//!
//! This crate provides the types shared by the storage layer, the
//! shortener service and the HTTP gateway.

pub mod encoding;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use encoding::IdEncoding;
pub use error::{CoreError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, UrlRecord};
pub use shortcode::ShortCode;
pub use shortener::{ShortenMode, ShortenParams, Shortener, DEFAULT_MIN_LENGTH};
