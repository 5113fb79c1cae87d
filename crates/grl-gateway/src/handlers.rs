mod script;
mod url;

pub use script::install_script_handler;
pub use url::{redirect_handler, shorten_handler};

use crate::error::AppError;

/// Fallback for every method a route does not serve.
pub async fn method_not_allowed_handler() -> AppError {
    AppError::MethodNotAllowed
}
