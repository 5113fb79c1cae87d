use axum::http::header;
use axum::response::IntoResponse;
use grl_shortener::render_install_script;

use crate::origin::RequestOrigin;

pub async fn install_script_handler(origin: RequestOrigin) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_install_script(&origin.base_url()),
    )
}
