use std::sync::Arc;

use grl_core::{ShortenMode, Shortener};

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    mode: ShortenMode,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>, mode: ShortenMode) -> Self {
        Self { shortener, mode }
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    /// How POST bodies are interpreted.
    pub fn mode(&self) -> ShortenMode {
        self.mode
    }
}
