use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Uri};
use grl_shortener::scan::DEFAULT_SCHEME;

/// Set by a TLS terminating proxy to tell the service which scheme the
/// client used.
pub const X_SCHEME: &str = "x-scheme";

/// Scheme and host the client used to reach the service.
///
/// Short links and the install script point back at this origin, so a single
/// deployment answers correctly under several host names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
}

impl RequestOrigin {
    /// The scheme comes from the request URI, then the `X-Scheme` header,
    /// and falls back to `http`. The host comes from the `Host` header, then
    /// the request URI.
    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Self {
        let scheme = uri
            .scheme_str()
            .map(str::to_owned)
            .or_else(|| header_value(headers, X_SCHEME))
            .unwrap_or_else(|| DEFAULT_SCHEME.to_owned());

        let host = header_value(headers, header::HOST.as_str())
            .or_else(|| uri.authority().map(|authority| authority.to_string()))
            .unwrap_or_default();

        Self { scheme, host }
    }

    /// `{scheme}://{host}`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for RequestOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(&parts.uri, &parts.headers))
    }
}
