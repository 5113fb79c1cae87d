//! HTTP surface of the grl URL shortener.
//!
//! `GET /` serves the client install script, `POST` on any path shortens the
//! request body and `GET /{code}` redirects to the stored URL. Every other
//! method answers `405 Not Allowed`.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod origin;
pub mod state;

pub use app::App;
pub use config::Config;
pub use state::AppState;
