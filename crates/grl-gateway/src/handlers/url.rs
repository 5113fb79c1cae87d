use crate::error::{AppError, Result};
use crate::origin::RequestOrigin;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use grl_core::{ShortCode, ShortenParams};
use tracing::{debug, info};

/// Shortens the raw request body; the answer is plain text.
pub async fn shorten_handler(
    State(state): State<AppState>,
    origin: RequestOrigin,
    body: Bytes,
) -> Result<String> {
    let params = ShortenParams {
        body: String::from_utf8_lossy(&body).into_owned(),
        base_url: origin.base_url(),
        mode: state.mode(),
    };
    debug!(bytes = body.len(), base_url = %params.base_url, "shorten request");

    let output = state.shortener().shorten(params).await?;
    info!(base_url = %origin.base_url(), "shortened request body");
    Ok(output)
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response> {
    let code = ShortCode::new_unchecked(code);

    let Some(record) = state.shortener().resolve(&code).await? else {
        return Err(AppError::NotFound(code));
    };

    let location = HeaderValue::try_from(record.original_url.as_str())
        .map_err(|_| AppError::InvalidRedirect(record.original_url.clone()))?;
    debug!(code = %code, location = %record.original_url, "redirecting");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
