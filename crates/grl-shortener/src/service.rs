use crate::scan::{self, Segment};
use async_trait::async_trait;
use grl_core::{
    IdEncoding, Repository, ShortCode, ShortenMode, ShortenParams, Shortener, ShortenerError,
    UrlRecord,
};
use std::sync::Arc;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// Settings shared by every request handled by a [`ShortenerService`].
#[derive(Debug, Clone, Copy, Default, TypedBuilder)]
pub struct ShortenerSettings {
    /// Encoding of minted codes; lookups expect the same encoding.
    #[builder(default)]
    pub encoding: IdEncoding,
}

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and handles:
/// - URL discovery in free text (scan mode)
/// - Scheme normalisation
/// - Minting one short code per shortened URL
///
/// Every mint is its own write transaction. When one fails, codes minted
/// earlier in the same request stay stored and the error is returned.
#[derive(Debug)]
pub struct ShortenerService<R> {
    repository: Arc<R>,
    settings: ShortenerSettings,
}

impl<R> Clone for ShortenerService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            settings: self.settings,
        }
    }
}

impl<R: Repository> ShortenerService<R> {
    pub fn new(repository: R, settings: ShortenerSettings) -> Self {
        Self {
            repository: Arc::new(repository),
            settings,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Stores `candidate` (normalised) and returns its short link.
    async fn mint(&self, candidate: &str, base_url: &str) -> Result<String, ShortenerError> {
        let record = UrlRecord::new(scan::normalize(candidate));
        let code = self
            .repository
            .mint(self.settings.encoding, record)
            .await?;

        Ok(code.to_url(base_url))
    }

    async fn shorten_scan(
        &self,
        body: &str,
        base_url: &str,
        min_length: usize,
    ) -> Result<String, ShortenerError> {
        let mut output = String::with_capacity(body.len());
        let mut minted = 0usize;

        for segment in scan::segments(body) {
            match segment {
                Segment::Url(url) if url.chars().count() >= min_length => {
                    output.push_str(&self.mint(url, base_url).await?);
                    minted += 1;
                }
                Segment::Url(url) => {
                    trace!(url, min_length, "url below minimum length, left as is");
                    output.push_str(url);
                }
                Segment::Text(text) => output.push_str(text),
            }
        }

        debug!(minted, "shortened urls in text");
        Ok(output)
    }
}

#[async_trait]
impl<R: Repository> Shortener for ShortenerService<R> {
    async fn shorten(&self, params: ShortenParams) -> Result<String, ShortenerError> {
        match params.mode {
            ShortenMode::Scan { min_length } => {
                self.shorten_scan(&params.body, &params.base_url, min_length)
                    .await
            }
            ShortenMode::WholeBody => self.mint(&params.body, &params.base_url).await,
        }
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<UrlRecord>, ShortenerError> {
        if !self.settings.encoding.accepts(code.as_str()) {
            trace!(code = %code, encoding = %self.settings.encoding, "code outside encoding alphabet");
            return Ok(None);
        }

        let record = self.repository.get(code).await?;
        match &record {
            Some(record) => debug!(code = %code, url = %record.original_url, "resolved short code"),
            None => trace!(code = %code, "short code not found"),
        }

        Ok(record)
    }
}
