//! URL shortener service implementation.
//!
//! This crate turns submitted text into short links and resolves short codes
//! back to URLs. It also renders the `grl` client script served on `GET /`.
//! Core types are re-exported from `grl_core`.

pub mod scan;
pub mod script;
pub mod service;

pub use grl_core::{ShortenMode, ShortenParams, Shortener, ShortenerError};
pub use script::render_install_script;
pub use service::{ShortenerService, ShortenerSettings};
