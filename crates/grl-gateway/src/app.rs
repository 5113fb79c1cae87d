use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    install_script_handler, method_not_allowed_handler, redirect_handler, shorten_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route(
                "/",
                get(install_script_handler)
                    .head(method_not_allowed_handler)
                    .post(shorten_handler)
                    .fallback(method_not_allowed_handler),
            )
            .route(
                "/{*code}",
                get(redirect_handler)
                    .head(method_not_allowed_handler)
                    .post(shorten_handler)
                    .fallback(method_not_allowed_handler),
            )
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(state)
    }
}
