use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Links shorter than this many characters are left alone in scan mode.
pub const DEFAULT_MIN_LENGTH: usize = 60;

/// How the body of a shorten request is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortenMode {
    /// Find URL-like substrings in the body and replace each one that is at
    /// least `min_length` characters long with a short link.
    Scan { min_length: usize },
    /// Treat the whole body as a single URL.
    WholeBody,
}

impl Default for ShortenMode {
    fn default() -> Self {
        ShortenMode::Scan {
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

/// Parameters for a shorten request.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The submitted text.
    pub body: String,
    /// `{scheme}://{host}` of the request, prefixed to every minted code.
    pub base_url: String,
    pub mode: ShortenMode,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens the request body and returns the text to send back: the
    /// rewritten body in scan mode, a single short link otherwise.
    async fn shorten(&self, params: ShortenParams) -> Result<String>;

    /// Resolves a short code to its stored URL record.
    /// Returns `None` if the code does not exist.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;
}
